//! shopfix bootstrap
//!
//! Prepares a shop test environment before a suite and restores the
//! database afterwards.

mod config;
mod steps;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Shop test environment bootstrap
#[derive(Parser, Debug)]
#[command(name = "bootstrap")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the test configuration file
    #[arg(long, default_value = "./shopfix.yml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Empty the temp directory, dump the database and install the shop as configured
    Prepare,
    /// Import the dump taken by `prepare`
    Restore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,shopfix_bootstrap=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::TestConfig::load(&cli.config)?;
    let bootstrap = steps::Bootstrap::new(config);

    match cli.command {
        Command::Prepare => {
            info!("Preparing test environment");
            bootstrap.prepare().await?;
        }
        Command::Restore => {
            info!("Restoring test environment");
            bootstrap.restore().await?;
        }
    }

    Ok(())
}
