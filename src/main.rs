//! CoTools agent demonstration binary.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cotools::cli::{self, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    cli::run(args).await
}
