//! Arpenteur command-line entry point

use anyhow::Context;
use arpenteur::config::{load_profile, CrawlConfig};
use arpenteur::crawler::{Crawler, TracingObserver};
use arpenteur::output::{build_report, default_report_path, write_report};
use arpenteur::session::{build_http_client, HttpSession};
use arpenteur::url::canonicalize;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Arpenteur: concurrent site mapper and data extractor
///
/// Explores a site from a seed URL up to configurable depth and page
/// bounds, extracts structured items and sensitive findings from every
/// visited page, and writes one JSON report.
#[derive(Parser, Debug)]
#[command(name = "arpenteur")]
#[command(version)]
#[command(about = "Concurrent site mapper and data extractor", long_about = None)]
struct Cli {
    /// Seed URL to start exploring from
    #[arg(value_name = "URL")]
    seed: String,

    /// Maximum number of pages to fetch
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Number of fetch sessions in the pool
    #[arg(long, value_name = "N")]
    pool_size: Option<usize>,

    /// Also explore links that leave the seed's site
    #[arg(long)]
    external: bool,

    /// Settle delay after each fetch, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// TOML profile applied underneath the flags above
    #[arg(long, value_name = "FILE")]
    profile: Option<PathBuf>,

    /// Report output path (defaults to data_<host>_<timestamp>.json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    tracing::info!(
        "Exploring {} (max {} pages, depth {}, {} workers, external: {})",
        config.seed_url,
        config.max_pages,
        config.max_depth,
        config.max_workers,
        config.explore_external
    );

    let client =
        build_http_client(concat!("arpenteur/", env!("CARGO_PKG_VERSION")))
            .context("failed to build HTTP client")?;
    let sessions = (0..config.pool_size)
        .map(|_| HttpSession::new(client.clone()))
        .collect();

    let crawler = Crawler::new(config, sessions, Arc::new(TracingObserver))
        .context("failed to start crawl")?;

    // Ctrl-C requests a cooperative stop; in-flight pages finish draining.
    let control = crawler.control();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            control.stop();
        }
    });

    let records = crawler.run().await;
    let stats = crawler.stats();

    let base_url = canonicalize(&cli.seed).context("seed URL became invalid")?;
    let report = build_report(&base_url, records);
    let path = cli
        .output
        .unwrap_or_else(|| default_report_path(&base_url));
    write_report(&report, &path).context("failed to write report")?;

    println!("Exploration finished. Report saved to {}", path.display());
    println!("Total pages explored: {}", report.metadata.total_pages);
    println!("Internal pages: {}", report.metadata.total_internal_pages);
    println!("External pages: {}", report.metadata.total_external_pages);
    println!(
        "Links found: {} internal, {} external",
        stats.internal_links, stats.external_links
    );
    println!(
        "Findings: {} emails, {} phones",
        stats.emails_found, stats.phones_found
    );
    if stats.errors > 0 {
        println!("Errors: {}", stats.errors);
    }

    Ok(())
}

/// Builds the crawl configuration from profile defaults and CLI flags
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = CrawlConfig::new(cli.seed.clone());

    if let Some(path) = &cli.profile {
        let profile = load_profile(path)
            .with_context(|| format!("failed to load profile {}", path.display()))?;
        config.apply_profile(&profile);
    }

    if let Some(v) = cli.max_pages {
        config.max_pages = v;
    }
    if let Some(v) = cli.max_depth {
        config.max_depth = v;
    }
    if let Some(v) = cli.workers {
        config.max_workers = v;
    }
    if let Some(v) = cli.pool_size {
        config.pool_size = v;
    }
    if cli.external {
        config.explore_external = true;
    }
    if let Some(v) = cli.delay_ms {
        config.page_delay = Duration::from_millis(v);
    }

    Ok(config)
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("arpenteur=info,warn"),
            1 => EnvFilter::new("arpenteur=debug,info"),
            2 => EnvFilter::new("arpenteur=trace,debug"),
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
