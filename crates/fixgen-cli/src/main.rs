//! # fixgen
//!
//! Fills Ethereum conformance fixtures from test specs and checks written
//! fixtures for self-consistency.
//!
//! ## Usage
//!
//! ```bash
//! # Fill every spec under tests/ with geth's evm as the transition tool
//! fixgen fill tests/ --t8n /usr/local/bin/evm --output fixtures
//!
//! # Share pre-allocations across engine tests
//! fixgen fill tests/ --t8n /usr/local/bin/evm --pre-alloc-groups
//!
//! # Re-check a fixture directory
//! fixgen verify fixtures
//!
//! # Show the effective configuration
//! fixgen config
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Ethereum conformance fixture generator
#[derive(Parser, Debug)]
#[command(name = "fixgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file, instead of ~/.fixgen/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Fill fixtures from spec files
    Fill(commands::fill::FillArgs),
    /// Verify written fixtures
    Verify(commands::verify::VerifyArgs),
    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `--json` output stays parseable
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    let result = Config::load(cli.config.as_deref()).and_then(|mut config| match cli.command {
        Commands::Fill(args) => {
            args.apply(&mut config);
            args.execute(&config, json)
        }
        Commands::Verify(args) => args.execute(&config, json),
        Commands::Config => show_config(&config, json),
    });

    if let Err(e) = result {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
            std::process::exit(1);
        }
        return Err(e.into());
    }
    Ok(())
}

fn show_config(config: &Config, json: bool) -> Result<(), CliError> {
    let path = Config::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    Output::new(json)
        .field("path", &path)
        .field_value("config", serde_json::to_value(config)?)
        .message(&config.to_toml()?)
        .print();
    Ok(())
}
