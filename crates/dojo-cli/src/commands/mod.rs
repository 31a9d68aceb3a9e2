pub mod arena;
pub mod evolve;
pub mod graduated;
pub mod stats;

use crate::cli::{Cli, Commands};
use anyhow::Result;

pub async fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Arena { prompt_file, count, threat_ratio, profile } => {
            arena::run(prompt_file, count, threat_ratio, &profile, cli.json).await
        }
        Commands::Evolve { generations, profile } => {
            evolve::run(generations, &profile, cli.json).await
        }
        Commands::Stats => stats::run(cli.json).await,
        Commands::Graduated => graduated::run(cli.json).await,
    }
}

/// Parses the `--profile` flag into a `ProfileType`, accepting the
/// camelCase wire spelling as well as the plain command-line spelling.
pub(crate) fn parse_profile(raw: &str) -> anyhow::Result<dojo_shared::ProfileType> {
    match raw.to_ascii_lowercase().as_str() {
        "child" => Ok(dojo_shared::ProfileType::Child),
        "senior" => Ok(dojo_shared::ProfileType::Senior),
        "familyadmin" | "family_admin" | "family-admin" => Ok(dojo_shared::ProfileType::FamilyAdmin),
        other => anyhow::bail!("unknown profile '{other}': expected child, senior, or familyAdmin"),
    }
}
