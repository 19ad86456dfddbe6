//! Stackwatch main entry point
//!
//! This is the command-line interface for the Stackwatch listing watcher.

use anyhow::{bail, Context};
use clap::Parser;
use stackwatch::config::{load_config_with_hash, Config};
use stackwatch::crawler::listing_url_builder;
use stackwatch::notify::{ConsoleNotifier, Fanout, LogNotifier, Notifier};
use stackwatch::output::{ConsoleDisplay, DisplaySink};
use stackwatch::watcher::{build_watcher, Shutdown};
use stackwatch::WatermarkTracker;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Stackwatch: an incremental question listing watcher
///
/// Stackwatch polls a tag's newest-first question listing, remembers the
/// highest question id it has shown, and prints only questions that are new
/// since the last check.
#[derive(Parser, Debug)]
#[command(name = "stackwatch")]
#[command(version = "1.0.0")]
#[command(about = "An incremental question listing watcher", long_about = None)]
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

    /// Run a single poll cycle and exit
    #[arg(long)]
    once: bool,

    /// Forget the stored watermark before starting
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be watched without fetching
    #[arg(long, conflicts_with_all = ["stats", "once", "fresh"])]
    dry_run: bool,

    /// Show statistics from the record database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "once", "fresh"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_watch(config, cli.once, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stackwatch=info,warn"),
            1 => EnvFilter::new("stackwatch=debug,info"),
            2 => EnvFilter::new("stackwatch=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be watched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Stackwatch Dry Run ===\n");

    println!("Target:");
    println!("  Label: {}", config.target.label);
    println!("  Base URL: {}", config.target.base_url);
    println!("  Page size: {}", config.target.page_size);

    println!("\nWatch:");
    println!("  Interval: {}s", config.watch.interval_secs);
    println!("  Fetch limit: {}", config.watch.fetch_limit);
    println!("  Early stop: {}", config.watch.early_stop);
    println!("  Skip backlog: {}", config.watch.skip_backlog);
    println!("  State file: {}", config.state_path().display());

    println!("\nFetch:");
    println!("  Attempts per page: {}", config.fetch.retries);
    println!("  Retry delay: {}ms", config.fetch.retry_delay_ms);
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Max pages: {}", config.fetch.max_pages);
    println!("  User agent: {}", config.fetch.user_agent);

    println!("\nOutput:");
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (none)"),
    }

    let url_builder = listing_url_builder(&config.target)?;
    println!("\n✓ Configuration is valid");
    println!("✓ Would start watching at {}", url_builder(1));

    Ok(())
}

/// Handles the --stats mode: shows statistics from the record database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use stackwatch::output::{load_statistics, print_statistics};
    use stackwatch::storage::SqliteStorage;

    let Some(path) = &config.output.database_path else {
        bail!("No database configured; set [output] database-path to use --stats");
    };

    println!("Database: {}\n", path);

    let storage = SqliteStorage::new(Path::new(path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main watch operation
async fn handle_watch(config: Config, once: bool, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        let state_path = config.state_path();
        tracing::info!("Discarding stored watermark at {}", state_path.display());
        WatermarkTracker::reset(&state_path)?;
    }

    let notifier: Arc<dyn Notifier> = Arc::new(
        Fanout::new()
            .with(Arc::new(LogNotifier))
            .with(Arc::new(ConsoleNotifier)),
    );
    let display: Arc<dyn DisplaySink> = Arc::new(ConsoleDisplay);

    let mut watcher = build_watcher(&config, display, notifier)?;

    if once {
        let report = watcher.check_once().await?;
        tracing::info!(
            "Cycle complete: {} candidates, {} new, {} skipped",
            report.candidates,
            report.new_records.len(),
            report.skipped
        );
        return Ok(());
    }

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, stopping after the current cycle");
                signal.trigger();
            }
            Err(e) => tracing::error!("Failed to listen for interrupt: {}", e),
        }
    });

    match watcher.run(&shutdown).await {
        Ok(()) => {
            tracing::info!("Watcher stopped cleanly");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Watcher failed: {}", e);
            Err(e.into())
        }
    }
}
