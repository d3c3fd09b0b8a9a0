use std::process;

use clap::Parser;
use oss_utils::cli::args::{Cli, Commands};
use oss_utils::cli::command::run_ssl;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn init_tracing(quiet: bool) {
    let default_level = if quiet { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Ssl(args) => {
            init_tracing(args.quiet);
            run_ssl(args).await
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
