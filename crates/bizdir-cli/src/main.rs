//! bizdir - browse the company directory from the terminal.
//!
//! Builds a single directory cache at startup and runs one command against
//! it. Data comes from the remote document database, or from a JSON fixture
//! file with `--fixture`.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bizdir_core::{
    Aggregator, Config, FetchReport, MemoryRecordStore, MergedCompanyView, RecordStore, RestRecordStore,
};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name inside `BIZDIR_LOG_DIR`
const LOG_FILE_NAME: &str = "bizdir.log";

#[derive(Parser)]
#[command(name = "bizdir", version, about = "Company directory browser")]
struct Cli {
    /// Read collections from a JSON fixture instead of the remote store
    #[arg(long, global = true, env = "BIZDIR_FIXTURE")]
    fixture: Option<PathBuf>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List merged company views
    List {
        /// Only branches that sell online
        #[arg(long)]
        online: bool,
        /// Only active branches
        #[arg(long)]
        active: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Re-read the store even if the cache is fresh
        #[arg(long)]
        refresh: bool,
    },
    /// Search companies by name or email
    Search {
        query: String,
        #[arg(long)]
        json: bool,
    },
    /// Show one branch with its hours, products and links
    Show {
        branch_id: String,
        #[arg(long)]
        json: bool,
    },
    /// Refresh and print per-collection diagnostics
    Status,
}

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr; set BIZDIR_LOG_DIR to also write a daily log file.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=bizdir_core=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os("BIZDIR_LOG_DIR") {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            Ok(config)
        }
        None => Config::load(),
    }
}

fn build_store(cli: &Cli, config: &Config) -> Result<Box<dyn RecordStore>> {
    match &cli.fixture {
        Some(path) => {
            info!(path = %path.display(), "Using fixture store");
            Ok(Box::new(MemoryRecordStore::load(path)?))
        }
        None => {
            if config.project_id.is_empty() || config.database_id.is_empty() {
                anyhow::bail!(
                    "No project or database configured. Set BIZDIR_PROJECT_ID and BIZDIR_DATABASE_ID, \
                     or pass --fixture <file>"
                );
            }
            let store = RestRecordStore::new(config).context("Failed to create store client")?;
            Ok(Box::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let store = build_store(&cli, &config)?;
    let directory = Aggregator::new(store, config);

    match &cli.command {
        Command::List {
            online,
            active,
            json,
            refresh,
        } => list(&directory, *online, *active, *json, *refresh).await,
        Command::Search { query, json } => search(&directory, query, *json).await,
        Command::Show { branch_id, json } => show(&directory, branch_id, *json).await,
        Command::Status => status(&directory).await,
    }
}

async fn list<S: RecordStore>(
    directory: &Aggregator<S>,
    online: bool,
    active: bool,
    json: bool,
    refresh: bool,
) -> Result<()> {
    directory.fetch_all(refresh).await;
    let views: Vec<MergedCompanyView> = match (online, active) {
        (true, _) => directory
            .online_views()
            .into_iter()
            .filter(|v| !active || v.branch.is_active)
            .collect(),
        (false, true) => directory.active_views(),
        (false, false) => directory.merge(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No companies found.");
    }
    for view in &views {
        println!("{}", summary_line(view));
    }
    Ok(())
}

async fn search<S: RecordStore>(directory: &Aggregator<S>, query: &str, json: bool) -> Result<()> {
    directory.fetch_all(false).await;
    let companies = directory.search_companies(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&companies)?);
        return Ok(());
    }

    if companies.is_empty() {
        println!("No companies match '{}'.", query);
    }
    for company in &companies {
        println!(
            "{:<12} {:<32} {}",
            company.company_id,
            company.name,
            company.email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn show<S: RecordStore>(directory: &Aggregator<S>, branch_id: &str, json: bool) -> Result<()> {
    directory.fetch_all(false).await;
    let view = directory
        .view(branch_id)
        .with_context(|| format!("No listed branch with id '{}'", branch_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{}", view.title());
    if view.is_verified {
        println!("  Verified");
    }
    println!("  Location:  {}", view.branch.location.as_deref().unwrap_or("-"));
    println!("  Contact:   {}", view.branch.contact.as_deref().unwrap_or("-"));
    println!("  Email:     {}", view.branch.email.as_deref().unwrap_or("-"));
    println!(
        "  Position:  {:.4}, {:.4} ({})",
        view.coordinates.lat, view.coordinates.lng, view.time_away
    );

    if !view.working_days.is_empty() {
        println!("  Hours:");
        for day in &view.working_days {
            println!("    {:<10} {}", day.day, day.hours.as_deref().unwrap_or("closed"));
        }
    }
    if !view.products.is_empty() {
        println!("  Products:");
        for product in &view.products {
            let price = product.price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string());
            println!(
                "    {:<24} {:>10}  {}",
                product.name,
                price,
                product.image_url.as_deref().unwrap_or("")
            );
        }
    }
    if !view.social_media.is_empty() {
        println!("  Links:");
        for link in &view.social_media {
            println!("    {:<10} {}", link.platform, link.url);
        }
    }
    Ok(())
}

async fn status<S: RecordStore>(directory: &Aggregator<S>) -> Result<()> {
    let views = directory.fetch_all(true).await;

    if let Some(failure) = directory.last_failure() {
        println!("Refresh failed: {}", failure);
    }
    match directory.last_report() {
        Some(report) => print_report(&report, views.len()),
        None => println!("No refresh has completed."),
    }
    println!("Cache updated {}", directory.status().age_display());
    Ok(())
}

fn print_report(report: &FetchReport, views: usize) {
    println!("Refresh took {} ms, {} listed branches", report.elapsed_ms(), views);
    for entry in &report.collections {
        let outcome = match &entry.error {
            Some(e) => format!("FAILED: {}", e),
            None if entry.skipped > 0 => format!("ok ({} malformed skipped)", entry.skipped),
            None => "ok".to_string(),
        };
        println!("  {:<14} {:>6}  {}", entry.collection.name(), entry.records, outcome);
    }
}

fn summary_line(view: &MergedCompanyView) -> String {
    let mut flags = Vec::new();
    if view.branch.is_online {
        flags.push("online");
    }
    if view.is_verified {
        flags.push("verified");
    }
    format!(
        "{:<12} {:<40} {:<20} {:<18} {}",
        view.branch_id(),
        view.title(),
        view.branch.location.as_deref().unwrap_or("-"),
        flags.join(","),
        view.time_away
    )
}
