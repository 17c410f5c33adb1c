//! Sublink main entry point
//!
//! This is the command-line trigger for the Sublink link harvester.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use sublink::config::{load_config_with_hash, Config};
use sublink::source::RedditSource;
use sublink::storage::{open_store, SqliteLinkStore};
use sublink::trigger::{run, validate};
use sublink::{CrawlOrchestrator, DomainPatternSet, SublinkError, TriggerResponse};
use tracing_subscriber::EnvFilter;

/// Number of stored links listed by --stats
const RECENT_LINKS_SHOWN: u32 = 10;

/// Sublink: harvests allow-listed links from forum discussions
///
/// Sublink walks a community's submissions newest-first back to a cutoff
/// date, expands every comment tree, and stores each link whose target
/// matches the configured allow-list.
#[derive(Parser, Debug)]
#[command(name = "sublink")]
#[command(version)]
#[command(about = "Harvests allow-listed links from forum discussions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Community to crawl
    #[arg(long, value_name = "NAME", required_unless_present_any = ["dry_run", "stats", "init_db"])]
    source: Option<String>,

    /// Oldest submission date to include (YYYY-MM-DD, UTC)
    #[arg(long, value_name = "DATE", required_unless_present_any = ["dry_run", "stats", "init_db"])]
    cutoff: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be used without crawling
    #[arg(long, conflicts_with_all = ["stats", "init_db"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "init_db"])]
    stats: bool,

    /// Create the database schema and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    init_db: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.init_db {
        handle_init_db(&config)
    } else {
        let source = cli.source.unwrap_or_default();
        let cutoff = cli.cutoff.unwrap_or_default();
        return handle_crawl(&config, &source, &cutoff).await;
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout carries only the trigger response.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sublink=info,warn"),
            1 => EnvFilter::new("sublink=debug,info"),
            2 => EnvFilter::new("sublink=trace,debug"),
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

/// Handles the --dry-run mode: shows the validated configuration
fn handle_dry_run(config: &Config) -> Result<(), SublinkError> {
    let patterns = DomainPatternSet::from_config(&config.filter)?;

    println!("=== Sublink Dry Run ===\n");

    println!("Source:");
    println!("  API base: {}", config.source.api_base);
    println!("  User agent: {}", config.source.user_agent);
    println!("  Page size: {}", config.source.page_size);
    println!("  Request timeout: {}s", config.source.request_timeout_secs);

    println!("\nAuthentication:");
    if config.auth.access_token.is_some() {
        println!("  Pre-issued access token");
    } else {
        println!("  Client credentials grant via {}", config.auth.token_url);
    }

    println!("\nCrawler:");
    println!(
        "  Request interval: {}ms",
        config.crawler.request_interval_ms
    );
    println!(
        "  Max expansion rounds: {}",
        config.crawler.max_expansion_rounds
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nAllowed Domains ({}):", patterns.len());
    for pattern in patterns.patterns() {
        println!("  - {}", pattern);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows stored link count and recent links
fn handle_stats(config: &Config) -> Result<(), SublinkError> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))?;

    println!("Stored links: {}", store.count_links()?);

    let recent = store.recent_links(RECENT_LINKS_SHOWN)?;
    if !recent.is_empty() {
        println!("\nMost recent:");
        for record in recent {
            println!(
                "  {} ({}, {})",
                record.url,
                record.submission_title.as_deref().unwrap_or("untitled"),
                record.submission_date.as_deref().unwrap_or("undated")
            );
        }
    }

    Ok(())
}

/// Handles the --init-db mode: creates the schema and exits
fn handle_init_db(config: &Config) -> Result<(), SublinkError> {
    open_store(Path::new(&config.output.database_path))?;
    println!("✓ Database ready: {}", config.output.database_path);
    Ok(())
}

/// Handles the main crawl: prints the trigger response as JSON
///
/// The request is validated before the database is opened.
async fn handle_crawl(config: &Config, source_name: &str, cutoff: &str) -> ExitCode {
    let response = match validate(source_name, cutoff) {
        Ok(request) => match build_orchestrator(config) {
            Ok(mut orchestrator) => run(&mut orchestrator, &request).await,
            Err(e) => {
                tracing::error!("Failed to set up crawl: {}", e);
                TriggerResponse::failure(&e)
            }
        },
        Err(response) => response,
    };

    match response.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::error!("Failed to render response: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn build_orchestrator(
    config: &Config,
) -> Result<CrawlOrchestrator<RedditSource, SqliteLinkStore>, SublinkError> {
    let source = RedditSource::from_config(config)?;
    let store = open_store(Path::new(&config.output.database_path))?;
    let patterns = DomainPatternSet::from_config(&config.filter)?;

    Ok(CrawlOrchestrator::new(
        source,
        store,
        patterns,
        &config.crawler,
    ))
}
