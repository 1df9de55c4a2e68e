//! Shopql CLI - database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! shopql migrate
//!
//! # Load a catalog fixture
//! shopql seed crates/cli/fixtures/catalog.yaml
//!
//! # Wipe catalog, cart, and orders first
//! shopql seed crates/cli/fixtures/catalog.yaml --reset
//! ```
//!
//! Both commands read `SHOPQL_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shopql")]
#[command(author, version, about = "Shopql CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load catalog data from a YAML fixture
    Seed {
        /// Path to the fixture file
        file: PathBuf,

        /// Delete all catalog, cart, and order rows before loading
        #[arg(long)]
        reset: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, reset } => commands::seed::run(&file, reset).await?,
    }
    Ok(())
}
