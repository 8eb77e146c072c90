//! Autopeças CLI - Database migrations and maintenance tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations
//! ap-cli migrate
//!
//! # Recreate the schema from scratch
//! ap-cli migrate --reset
//!
//! # Load sample catalog data
//! ap-cli seed
//!
//! # Point stored image URLs at a CDN
//! ap-cli patch-urls --from http://localhost:3000/uploads --to https://cdn.loja.com.br
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert sample categories, products, slides and a coupon
//! - `patch-urls` - Rewrite stored URL prefixes
//!
//! Connection settings come from `DB_*` environment variables (see
//! [`config`]). Set `LOG_FORMAT=json` for JSON log lines.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod db;
mod error;

use commands::patch_urls::PrefixRewrite;
use config::DbConfig;
use error::CliError;

#[derive(Parser)]
#[command(name = "ap-cli")]
#[command(author, version, about = "Autopeças database maintenance tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        /// Drop and recreate the public schema first (destroys all data)
        #[arg(long)]
        reset: bool,

        /// Directory holding the `.sql` files
        #[arg(long, default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"))]
        dir: PathBuf,
    },
    /// Insert sample data
    Seed {
        /// Empty the catalog, cart and order tables first
        #[arg(long)]
        reset: bool,
    },
    /// Rewrite the prefix of stored image and link URLs
    PatchUrls {
        /// Prefix to replace
        #[arg(long)]
        from: String,

        /// Replacement prefix
        #[arg(long)]
        to: String,

        /// Count matching rows without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(parse_exit_code(e.kind()));
        }
    };

    if let Err(e) = run(cli).await {
        error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Exit code for a failed parse: `--help` and `--version` are not failures.
const fn parse_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "autopecas_cli=info".into());

    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json");
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    // Reject bad arguments before touching the database.
    let rewrite = match &cli.command {
        Commands::PatchUrls { from, to, .. } => Some(PrefixRewrite::new(from, to)?),
        _ => None,
    };

    let config = DbConfig::from_env()?;
    info!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        "Connecting to database"
    );
    let pool = db::create_pool(&config).await?;

    let result = match (cli.command, rewrite) {
        (Commands::Migrate { reset, dir }, _) => {
            commands::migrate::run(&pool, &dir, reset).await.map(drop)
        }
        (Commands::Seed { reset }, _) => commands::seed::run(&pool, reset).await.map(|summary| {
            info!(
                categories = summary.categories,
                products = summary.products,
                slides = summary.slides,
                coupons = summary.coupons,
                "Seed complete"
            );
        }),
        (Commands::PatchUrls { dry_run, .. }, Some(rewrite)) => {
            commands::patch_urls::run(&pool, &rewrite, dry_run)
                .await
                .map(drop)
        }
        (Commands::PatchUrls { .. }, None) => Err(CliError::InvalidArgument(
            "--from and --to are required".to_string(),
        )),
    };

    pool.close().await;
    result
}
