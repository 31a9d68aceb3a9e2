use colored::Colorize;

/// Formats an error for CLI display with a cause chain.
pub fn display_error(err: &anyhow::Error) {
    eprintln!("  {} {}", "ERROR".red().bold(), err);
    for cause in err.chain().skip(1) {
        eprintln!("        {} {cause}", "caused by:".dimmed());
    }
}
