//! Larkspur CLI - Session-store migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the tower-sessions table in the storefront database
//! lark-cli migrate
//!
//! # List the OAuth providers the commerce API has enabled
//! lark-cli providers
//! ```
//!
//! # Commands
//!
//! - `migrate` - Create/upgrade the session-store schema
//! - `providers` - Query the commerce API's enabled OAuth providers

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)] // a CLI's output belongs on stdout

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lark-cli")]
#[command(author, version, about = "Larkspur CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create/upgrade the session-store schema
    Migrate,
    /// List the OAuth providers the commerce API has enabled
    Providers,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Migrate => commands::migrate::sessions().await?,
        Commands::Providers => commands::providers::list().await?,
    }
    Ok(())
}
