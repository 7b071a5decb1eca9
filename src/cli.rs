//! Command-line interface.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use cotools_core::AgentConfig;

use crate::runtime::AgentRuntime;
use crate::scenarios;

/// Sample query used when none is provided
const SAMPLE_QUERY: &str =
    "What was the weather in my destination city yesterday, and what's the capital of that country?";

/// Run the Chain-of-Tools agent demonstration
#[derive(Debug, Parser)]
#[command(name = "cotools", version, about)]
pub struct Args {
    /// User query to process; a sample query is used when omitted
    #[arg(short, long)]
    pub query: Option<String>,

    /// Interactive mode, reading queries until 'quit'
    #[arg(short, long)]
    pub interactive: bool,

    /// Run the predetermined demonstration scenarios
    #[arg(short = 'a', long)]
    pub auto_demo: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Path to a TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the database path
    #[arg(long)]
    pub database: Option<String>,
}

impl Args {
    /// Resolve the effective configuration: file, environment, flags
    pub fn resolve_config(&self) -> Result<AgentConfig> {
        let base = match &self.config {
            Some(path) => AgentConfig::from_file(path)?,
            None => AgentConfig::default(),
        };
        let mut config = base.apply_env_overrides()?;
        if let Some(database) = &self.database {
            config.database_path = database.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Entry point after argument parsing and logging setup
pub async fn run(args: Args) -> Result<()> {
    let config = args.resolve_config()?;
    let runtime = AgentRuntime::initialize(config).await?;
    println!("CoTools agent initialized successfully.");

    if args.auto_demo {
        return scenarios::run_all(&runtime).await;
    }
    if args.interactive {
        return run_interactive(&runtime).await;
    }

    let query = args.query.as_deref().unwrap_or(SAMPLE_QUERY);
    runtime.process(query).await?;
    Ok(())
}

async fn run_interactive(runtime: &AgentRuntime) -> Result<()> {
    let stdin = io::stdin();
    loop {
        print!("\nEnter your query (or 'quit' to exit): ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "quit" | "exit" | "q") {
            break;
        }
        runtime.process(query).await?;
    }
    Ok(())
}
