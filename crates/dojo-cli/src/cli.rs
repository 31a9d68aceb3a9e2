use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "dojo",
    about = "Guardian Dojo — a training harness for evolving content-classification prompts",
    version,
    propagate_version = true
)]
pub struct Cli {
    /// Output raw JSON (for scripting/piping)
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one arena session: a single guardian against a freshly
    /// generated scenario batch
    Arena {
        /// Path to a file holding the guardian's system prompt; uses the
        /// general-protector seed prompt if omitted
        #[arg(long)]
        prompt_file: Option<String>,
        /// Number of scenarios in the batch
        #[arg(long, default_value_t = 20)]
        count: usize,
        /// Fraction of the batch that is threat content
        #[arg(long, default_value_t = 0.6)]
        threat_ratio: f64,
        /// Protected profile: child, senior, or familyAdmin
        #[arg(long, default_value = "child")]
        profile: String,
    },

    /// Run the multi-generation evolution loop
    Evolve {
        /// Number of generations to run
        #[arg(long, default_value_t = 5)]
        generations: u64,
        /// Protected profile: child, senior, or familyAdmin
        #[arg(long, default_value = "child")]
        profile: String,
    },

    /// Show counts from the encrypted record store
    Stats,

    /// List graduated guardians from the lineage store
    Graduated,
}
