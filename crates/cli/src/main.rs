//! Toys Marketplace CLI - Operator tools for the marketplace REST API.
//!
//! # Usage
//!
//! ```bash
//! # Check that the API answers its health endpoint
//! toys-cli health
//!
//! # Create the starter catalog as an admin
//! toys-cli seed --file crates/cli/seed/catalog.yaml \
//!     --email admin@toysmarketplace.com --password admin123
//!
//! # Validate a seed file without calling the API
//! toys-cli seed --file crates/cli/seed/catalog.yaml --dry-run
//!
//! # List categories and products
//! toys-cli catalog
//! ```
//!
//! # Environment Variables
//!
//! - `MARKETPLACE_API_URL` - API base URL (or `--api-url`)
//! - `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD` - Admin credentials for `seed`
//! - `RUST_LOG` - Log filter (default: `toys_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "toys-cli")]
#[command(author, version, about = "Toys Marketplace CLI tools")]
struct Cli {
    /// Marketplace REST API base URL
    #[arg(long, env = "MARKETPLACE_API_URL", default_value = "http://localhost:8000")]
    api_url: Url,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the marketplace API is reachable
    Health,
    /// Create categories and products from a YAML seed file
    Seed {
        /// Path to the seed file
        #[arg(short, long)]
        file: PathBuf,

        /// Admin email used to sign in
        #[arg(short, long, env = "SEED_ADMIN_EMAIL", required_unless_present = "dry_run")]
        email: Option<String>,

        /// Admin password used to sign in
        #[arg(short, long, env = "SEED_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Only parse and validate the file
        #[arg(long)]
        dry_run: bool,
    },
    /// List categories and their products
    Catalog,
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toys_cli=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let api = commands::api_client(cli.api_url);

    match cli.command {
        Commands::Health => commands::health::check(&api).await?,
        Commands::Seed {
            file,
            email,
            password,
            dry_run,
        } => {
            let seed = commands::seed::load(&file).await?;
            if dry_run {
                tracing::info!("Dry run: {} is valid", file.display());
                return Ok(());
            }
            let email = email.ok_or("--email or SEED_ADMIN_EMAIL is required")?;
            let password = password
                .map(SecretString::from)
                .ok_or("--password or SEED_ADMIN_PASSWORD is required")?;
            commands::seed::run(&api, &email, &password, &seed).await?;
        }
        Commands::Catalog => commands::catalog::list(&api).await?,
    }
    Ok(())
}
