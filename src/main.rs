//! Subsite-Crawler main entry point
//!
//! This is the command-line interface for the Subsite-Crawler site indexer.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use subsite_crawler::config::{apply_overrides, load_config_with_hash, Config, ConfigOverrides};
use subsite_crawler::index::{DocumentStore, SqliteIndexer};
use subsite_crawler::output::{load_statistics, print_report, print_statistics};
use subsite_crawler::{Controller, CrawlRequest};
use tracing_subscriber::EnvFilter;

/// Subsite-Crawler: crawl one site and index its pages
///
/// Subsite-Crawler visits every page reachable below a base URL with a pool of
/// concurrent workers, extracts the main content of each page and stores it
/// in a SQLite document index.
#[derive(Parser, Debug)]
#[command(name = "subsite-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A site-scoped crawler that feeds a document index", long_about = None)]
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

    /// Crawl this base URL instead of the configured one
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Start from this URL (repeatable; replaces the configured seeds)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the document index and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let overrides = ConfigOverrides {
        base_url: cli.base_url,
        seed_urls: cli.seeds,
        worker_pool_size: cli.workers,
    };
    if let Err(e) = apply_overrides(&mut config, overrides) {
        tracing::error!("Invalid command-line override: {}", e);
        return Err(e.into());
    }

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("subsite_crawler=info,warn"),
            1 => EnvFilter::new("subsite_crawler=debug,info"),
            2 => EnvFilter::new("subsite_crawler=trace,debug"),
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
    println!("=== Subsite-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Workers: {}", config.crawler.worker_pool_size);

    let seeds = effective_seeds(config);
    println!("  Seeds ({}):", seeds.len());
    for seed in &seeds {
        println!("    * {}", seed);
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!(
        "  Certificate verification: {}",
        if config.http.accept_invalid_certs { "disabled" } else { "enabled" }
    );

    println!("\nExtractor:");
    println!("  Content selector: {}", config.extractor.content_selector);
    println!("  Noise selectors: {}", config.extractor.noise_selectors.join(", "));
    println!("  Text width: {}", config.extractor.text_width);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());
}

/// Seeds the crawl will start from: the configured ones, or the base URL
fn effective_seeds(config: &Config) -> Vec<String> {
    if config.crawler.seed_urls.is_empty() {
        vec![config.crawler.base_url.clone()]
    } else {
        config.crawler.seed_urls.clone()
    }
}

/// Handles the --stats mode: shows statistics from the document index
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.output.database_path);

    // Open the database
    let store = SqliteIndexer::new(Path::new(&config.output.database_path))?;

    // Load statistics
    let stats = load_statistics(&store)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(SqliteIndexer::new(Path::new(&config.output.database_path))?);
    let run_id = store.create_run(&config.crawler.base_url, config_hash)?;
    tracing::info!(
        "Starting run {} for {} ({} seed URLs)",
        run_id,
        config.crawler.base_url,
        effective_seeds(config).len()
    );

    let controller = Controller::from_config(config, store.clone())?;

    // Run the crawler
    match controller.crawl(CrawlRequest::from_config(config)).await {
        Ok(report) => {
            store.complete_run(run_id, report.visited as u64)?;
            tracing::info!("Crawl completed successfully");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            if let Err(store_err) = store.fail_run(run_id) {
                tracing::error!("Failed to mark run {} as failed: {}", run_id, store_err);
            }
            Err(e.into())
        }
    }
}
