//! Folio-Harvest main entry point
//!
//! Command-line interface: serve the API (default), run a one-off ingest, or
//! print store statistics.

use clap::Parser;
use folio_harvest::config::load_config_with_hash;
use folio_harvest::storage::{open_storage, BookStore};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Folio-Harvest: a book catalog collector and query API
///
/// Crawls a paginated book catalog site into a SQLite store and serves the
/// collected data over HTTP with statistics and a token-gated re-collection
/// trigger.
#[derive(Parser, Debug)]
#[command(name = "folio-harvest")]
#[command(version)]
#[command(about = "Book catalog collector and query API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run one ingest against the configured site and exit
    #[arg(long, conflicts_with = "stats")]
    ingest: bool,

    /// Show statistics from the store and exit
    #[arg(long, conflicts_with = "ingest")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)?;
    tracing::info!(hash = %config_hash, "Configuration loaded");

    if cli.ingest {
        handle_ingest(config).await?;
    } else if cli.stats {
        handle_stats(config)?;
    } else {
        handle_serve(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("folio_harvest=info,warn"),
            1 => EnvFilter::new("folio_harvest=debug,info"),
            2 => EnvFilter::new("folio_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --ingest mode: one collection run, report printed as JSON
async fn handle_ingest(config: folio_harvest::Config) -> anyhow::Result<()> {
    let store = open_storage(std::path::Path::new(&config.output.database_path))?;
    let store = std::sync::Mutex::new(store);

    let cancel = CancellationToken::new();
    let report = folio_harvest::scraper::run_ingest(&config, &store, &cancel).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Handles the --stats mode: prints store statistics and exits
fn handle_stats(config: folio_harvest::Config) -> anyhow::Result<()> {
    let store = open_storage(std::path::Path::new(&config.output.database_path))?;

    let overview = store.overview_stats()?;
    println!("Database: {}\n", config.output.database_path);
    println!("Total books:      {}", overview.total_books);
    println!("Categories:       {}", overview.total_categories);
    println!("In stock:         {}", overview.in_stock);
    println!("Average price:    {:.2}", overview.average_price);
    println!("Price range:      {:.2} - {:.2}", overview.min_price, overview.max_price);

    println!("\nBy category:");
    for entry in store.category_stats()? {
        println!(
            "  {:<30} {:>5} books, avg {:.2}",
            entry.category, entry.book_count, entry.average_price
        );
    }

    Ok(())
}

/// Handles the default mode: serve the HTTP API
async fn handle_serve(config: folio_harvest::Config) -> anyhow::Result<()> {
    let store = open_storage(std::path::Path::new(&config.output.database_path))?;

    tracing::info!(
        site = %config.site.base_url,
        db = %config.output.database_path,
        "starting API server"
    );

    folio_harvest::server::run_server(config, store).await?;
    Ok(())
}
