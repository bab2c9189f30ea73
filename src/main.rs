//! Sitemap-Harvest main entry point
//!
//! This is the command-line interface for the Sitemap-Harvest sitemap enumerator.

use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use sitemap_harvest::config::{load_config_with_hash, Config, IndexBackend};
use sitemap_harvest::crawler::{crawl, RunIdentity};
use sitemap_harvest::model::ProcessedByType;
use sitemap_harvest::output::print_statistics;
use sitemap_harvest::url::{join_url, parse_http_url};
use tracing_subscriber::EnvFilter;

/// Sitemap-Harvest: a polite sitemap enumerator
///
/// Sitemap-Harvest reads the sitemaps a website advertises in its robots.txt,
/// walks them breadth-first and writes one JSON record per entry. URLs that
/// have not changed since they were last recorded are skipped.
#[derive(Parser, Debug)]
#[command(name = "sitemap-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite sitemap enumerator", long_about = None)]
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

    /// Mark this run as scheduled rather than manual
    #[arg(long)]
    scheduled: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Override the configured home URL
    #[arg(long, value_name = "URL")]
    home_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let mut config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(home_url) = cli.home_url {
        if let Err(e) = parse_http_url(&home_url) {
            tracing::error!("Invalid --home-url: {}", e);
            return Err(e.into());
        }
        config.crawler.home_url = home_url;
    }

    if cli.scheduled {
        config.crawler.processed_by_type = ProcessedByType::Scheduled;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout may carry the JSON-lines output.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitemap_harvest=info,warn"),
            1 => EnvFilter::new("sitemap_harvest=debug,info"),
            2 => EnvFilter::new("sitemap_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let crawler = &config.crawler;
    let request = &config.request;
    let identity = RunIdentity::new(
        &crawler.home_url,
        crawler.processed_by_type,
        Utc::now(),
        crawler.processed_by.clone(),
    );

    println!("=== Sitemap-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Home URL: {}", crawler.home_url);
    println!(
        "  Robots resource: {}",
        join_url(&crawler.home_url, &crawler.robots_resource)?
    );
    println!("  Sleep between sitemaps: {}ms", crawler.sleep_time_ms);
    println!("  Run type: {}", crawler.processed_by_type);
    println!("  Run identifier: {}", identity.processed_by());

    println!("\nRequest Profile:");
    println!("  Method: {}", request.method.to_uppercase());
    println!("  Follow redirects: {}", request.allow_redirects);
    println!("  Browser headers: {}", request.update_headers);
    println!("  Extra headers: {}", request.headers.len());
    println!(
        "  Retries: {} attempt(s), {}ms apart, on {:?}",
        request.retry_tries, request.retry_delay_ms, request.retry_status_codes
    );
    println!("  Timeout: {}ms", request.timeout_ms);

    println!("\nIndex:");
    match config.index.backend {
        IndexBackend::Sqlite => println!("  SQLite: {}", config.index.database_path),
        IndexBackend::Redis => println!("  Redis: {}", config.index.redis_url()),
        IndexBackend::Memory => println!("  In-memory (nothing persisted)"),
    }

    println!("\nOutput:");
    if config.output.is_stdout() {
        println!("  stdout");
    } else {
        println!("  {}", config.output.path);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling sitemaps of {} ({} run)",
        config.crawler.home_url,
        config.crawler.processed_by_type
    );

    match crawl(config).await {
        Ok(stats) => {
            tracing::info!("Crawl completed successfully");
            print_statistics(&stats);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
