//! Outlink main entry point
//!
//! This is the command-line interface for the Outlink outbound-link auditor.

use clap::Parser;
use outlink::config::{load_config_with_hash, validate, validate_seed, Config, RetryPolicy};
use outlink::crawler::{Coordinator, RetryPrompt};
use outlink::output::{print_statistics, write_reports, CrawlStatistics};
use outlink::url::{root_prefix, CanonicalUrl, TargetHostnames};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// How many broken links to list before asking whether to retry
const PROMPT_PREVIEW: usize = 10;

/// Outlink: a polite outbound-link auditor
///
/// Outlink crawls every page of a single site while respecting robots.txt,
/// and reports which pages link to the external hosts you care about, which
/// link elsewhere, and which links are broken.
#[derive(Parser, Debug)]
#[command(name = "outlink")]
#[command(version)]
#[command(about = "A polite outbound-link auditor", long_about = None)]
struct Cli {
    /// Absolute http(s) URL the crawl starts from
    #[arg(value_name = "SEED_URL")]
    seed: String,

    /// Hostname substring that marks an external link as a target (repeatable)
    #[arg(short, long = "target", value_name = "SUBSTRING")]
    targets: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of concurrent fetch workers
    #[arg(short, long)]
    workers: Option<u32>,

    /// What to do with broken links when the crawl drains
    #[arg(long, value_enum)]
    retry: Option<RetryPolicy>,

    /// Directory report files are written into
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    (cfg, Some(hash))
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => (Config::default(), None),
    };

    apply_overrides(&mut config, &cli);
    validate(&config)?;

    let targets = TargetHostnames::new(&cli.targets);

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed, &targets)?;
    } else {
        handle_crawl(config, config_hash, &cli.seed, targets).await?;
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
            0 => EnvFilter::new("outlink=info,warn"),
            1 => EnvFilter::new("outlink=debug,info"),
            2 => EnvFilter::new("outlink=trace,debug"),
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

/// Command-line flags win over the config file
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(retry) = cli.retry {
        config.crawler.retry_policy = retry;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
}

/// Handles the --dry-run mode: validates inputs and shows what would be crawled
fn handle_dry_run(
    config: &Config,
    seed: &str,
    targets: &TargetHostnames,
) -> Result<(), Box<dyn std::error::Error>> {
    let seed = validate_seed(seed)?;
    let root = root_prefix(&seed, &config.canonical)?;

    println!("=== Outlink Dry Run ===\n");

    println!("Seed: {}", seed);
    println!("Site root: {}", root);
    if targets.is_empty() {
        println!("Targets: (none, every external link is a target)");
    } else {
        println!("Targets: {}", targets.as_slice().join(", "));
    }

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Timeouts: connect {}s, read {}s",
        config.crawler.connect_timeout_secs, config.crawler.read_timeout_secs
    );
    println!(
        "  Retry policy: {:?} (max {} rounds)",
        config.crawler.retry_policy, config.crawler.max_retry_rounds
    );
    println!("  Require robots.txt: {}", config.crawler.require_robots);

    println!("\nUser Agent:");
    println!("  Header: {}", config.user_agent.header_value());
    println!("  Robots agent: {}", config.user_agent.robots_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Formats: {:?}", config.output.formats);

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: Option<String>,
    seed: &str,
    targets: TargetHostnames,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = config.output.clone();

    let mut coordinator = match Coordinator::new(config, seed, targets).await {
        Ok(coordinator) => coordinator.with_prompt(Box::new(StdinPrompt)),
        Err(e) => {
            tracing::error!("Crawl setup failed: {}", e);
            return Err(e.into());
        }
    };
    if let Some(hash) = config_hash {
        coordinator = coordinator.with_config_hash(hash);
    }

    let shutdown = coordinator.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; finishing in-flight fetches");
            shutdown.shutdown();
        }
    });

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    for path in write_reports(&report, &output)? {
        tracing::info!("Report written: {}", path.display());
    }

    println!();
    print_statistics(&CrawlStatistics::from_report(&report));

    Ok(())
}

/// Asks on stdin whether broken links should be retried
struct StdinPrompt;

impl RetryPrompt for StdinPrompt {
    fn confirm_retry(&mut self, broken: &[CanonicalUrl]) -> bool {
        println!("\n{} broken links:", broken.len());
        for url in broken.iter().take(PROMPT_PREVIEW) {
            println!("  {}", url.as_str());
        }
        if broken.len() > PROMPT_PREVIEW {
            println!("  ... and {} more", broken.len() - PROMPT_PREVIEW);
        }
        print!("Retry broken links? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        read_answer(&mut io::stdin().lock())
    }
}

/// Reads a yes/no answer without stalling the runtime's other tasks
///
/// The prompt is called from inside the crawl loop on a runtime worker, so
/// the blocking read is moved off it with `block_in_place`.
fn read_answer<R: BufRead>(reader: &mut R) -> bool {
    let mut answer = String::new();
    match tokio::task::block_in_place(|| reader.read_line(&mut answer)) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(e) => {
            tracing::warn!("Could not read answer: {}", e);
            false
        }
    }
}
