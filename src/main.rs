use std::process;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use autonfs::cli::{run_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; the watcher runs as a daemon, so informational
    // verdict logs are on by default
    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    if let Err(e) = run_command(cli.command).await {
        error!("{e}");
        process::exit(1);
    }
}
