mod cli;
mod commands;
mod error;
mod output;
mod storage;

use clap::Parser;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    if let Err(e) = commands::dispatch(cli).await {
        error::display_error(&e);
        std::process::exit(1);
    }
}
