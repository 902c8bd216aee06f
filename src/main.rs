mod config;
mod db;
mod error;
mod fetch;
mod models;
mod parser;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use config::Config;
use db::Storage;
use fetch::HttpSource;
use pipeline::{Persisted, Report};

#[derive(Parser)]
#[command(name = "weather_scraper", about = "Current weather from gismeteo with a SQLite fallback")]
struct Cli {
    /// JSON config file (URL, timeout, DB path, selectors)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and table, seeding a placeholder row if empty
    Init,
    /// Fetch the current reading, store it, and print the report
    /// (falls back to the latest stored reading when the page is unreachable)
    Run,
    /// Print the latest stored reading without fetching
    Latest,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let storage = Storage::new(&config.db_path);

    match cli.command {
        Commands::Init => {
            let seeded = storage.initialize()?;
            println!("Database ready at {}", storage.path().display());
            if seeded {
                println!("Seeded placeholder reading.");
            }
        }
        Commands::Run => {
            let source = HttpSource::new(&config)?;
            let report = pipeline::run_with_setup(&source, &storage).await?;
            match &report {
                Report::Live {
                    persisted: Persisted::Stored(id),
                    ..
                } => info!("Reading saved as #{}", id),
                Report::Live {
                    persisted: Persisted::Failed(e),
                    ..
                } => warn!("Reading was not saved: {}", e),
                Report::Fallback { cause, .. } => warn!("Live fetch failed: {}", cause),
            }
            println!("{}", report);
        }
        Commands::Latest => {
            storage.initialize()?;
            let reading = storage.read_latest()?;
            println!("{}", Report::stored_text(&reading));
        }
    }

    Ok(())
}
