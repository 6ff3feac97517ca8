//! Preview pipeline main entry point
//!
//! This is the command-line interface for the link-preview scrape pipeline.

use anyhow::Context;
use clap::Parser;
use preview_pipeline::config::{load_config_with_hash, Config};
use preview_pipeline::fetcher::HttpFetcher;
use preview_pipeline::storage::{open_storage, ArticleStore};
use preview_pipeline::Pipeline;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Preview Pipeline: background link-preview scraping
///
/// Submitted URLs are stored as pending articles and scraped in the
/// background for their title, description and preview image. Failed
/// scrapes are retried on a fixed schedule.
#[derive(Parser, Debug)]
#[command(name = "preview-pipeline")]
#[command(version)]
#[command(about = "Background link-preview scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URLs to submit once the pipeline is running
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the effective settings without starting
    #[arg(long, conflicts_with_all = ["stats", "list"])]
    dry_run: bool,

    /// Show article counts per scrape status and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list"])]
    stats: bool,

    /// List the most recently submitted articles and exit
    #[arg(long, value_name = "LIMIT", num_args = 0..=1, default_missing_value = "20",
          conflicts_with_all = ["dry_run", "stats"])]
    list: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if let Some(limit) = cli.list {
        handle_list(&config, limit)?;
    } else {
        handle_run(config, &cli.urls).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("preview_pipeline=info,warn"),
            1 => EnvFilter::new("preview_pipeline=debug,info"),
            2 => EnvFilter::new("preview_pipeline=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Preview Pipeline Dry Run ===\n");

    println!("Pipeline:");
    println!("  Queue capacity: {}", config.pipeline.queue_capacity);
    println!("  Workers: {}", config.pipeline.worker_count);
    println!("  Task timeout: {}s", config.pipeline.task_timeout_secs);
    println!(
        "  Retry interval: {}s",
        config.pipeline.scheduler_interval_secs
    );
    println!("  Max retries: {}", config.pipeline.max_retries);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Max redirects: {}", config.http.max_redirects);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows article counts from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.storage.database_path))?;
    let counts = store.count_by_status()?;

    println!("Database: {}\n", config.storage.database_path);
    println!("  Pending: {}", counts.pending);
    println!("  Success: {}", counts.success);
    println!("  Failed:  {}", counts.failed);
    println!("  Total:   {}", counts.total());

    let retryable = store.find_failed_scrapes(config.pipeline.max_retries)?;
    println!(
        "\n{} failed article(s) still eligible for retry",
        retryable.len()
    );

    Ok(())
}

/// Handles the --list mode: prints recent articles
fn handle_list(config: &Config, limit: usize) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.storage.database_path))?;

    for article in store.list_articles(limit)? {
        println!(
            "{}  {:<7}  retries={}  {}",
            article.id, article.status, article.retry_count, article.url
        );
        if let Some(title) = article.title.as_deref().filter(|t| !t.is_empty()) {
            println!("    title: {}", title);
        }
        if let Some(error) = &article.last_error {
            println!("    last error: {}", error);
        }
    }

    Ok(())
}

/// Handles the main run mode: starts the pipeline and runs until Ctrl-C
async fn handle_run(config: Config, urls: &[String]) -> anyhow::Result<()> {
    let store: Arc<dyn ArticleStore> =
        Arc::new(open_storage(Path::new(&config.storage.database_path))?);
    let fetcher = Arc::new(HttpFetcher::from_config(&config.http)?);

    let pipeline = Pipeline::start(&config.pipeline, store, fetcher);

    for url in urls {
        match pipeline.submit(url) {
            Ok(article) => tracing::info!("Submitted {} as article {}", url, article.id),
            Err(e) => tracing::error!("Failed to submit {}: {}", url, e),
        }
    }

    tracing::info!("Running; press Ctrl-C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    pipeline.shutdown().await;
    Ok(())
}
