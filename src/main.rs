//! lexcrawl main entry point
//!
//! This is the command-line interface for the lexcrawl legal-document crawler.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lexcrawl::config::{load_config_with_hash, Config};
use lexcrawl::crawler::{run_crawl, CancelToken, CrawlParams, LawClient};
use lexcrawl::output::{print_report, read_json};
use lexcrawl::text;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// lexcrawl: a parallel crawler for legal-document APIs
///
/// lexcrawl pages through the document search for a publication window,
/// fetches every document's detail over a pool of workers and writes the
/// ordered records to JSON (and optionally SQLite).
#[derive(Parser, Debug)]
#[command(name = "lexcrawl")]
#[command(version)]
#[command(about = "A parallel crawler for legal-document APIs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the configured window (the default)
    Crawl(CrawlArgs),

    /// List the document statuses known upstream
    Statuses,

    /// List the issuing organizations known upstream
    Organizations,

    /// List the Q&A articles linked to a document
    Questions {
        #[arg(long)]
        law_id: i64,
    },

    /// Show upstream's suggested related documents
    Suggest {
        #[arg(long)]
        law_id: i64,
    },

    /// Split the documents of a crawl output file into articles
    Articles {
        /// JSON file written by `crawl`
        #[arg(value_name = "JSON")]
        path: PathBuf,
    },
}

#[derive(clap::Args, Debug, Default)]
struct CrawlArgs {
    /// Number of concurrent workers
    #[arg(short = 'w', long)]
    num_workers: Option<usize>,

    /// Output JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// First publication date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<NaiveDate>,

    /// Last publication date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    end_date: Option<NaiveDate>,
}

impl CrawlArgs {
    fn apply(&self, mut params: CrawlParams) -> CrawlParams {
        if let Some(n) = self.num_workers {
            params.num_workers = n;
        }
        if let Some(path) = &self.output {
            params.output_path = path.clone();
        }
        if let Some(date) = self.start_date {
            params.start_date = date;
        }
        if let Some(date) = self.end_date {
            params.end_date = date;
        }
        params
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let command = cli
        .command
        .unwrap_or_else(|| Command::Crawl(CrawlArgs::default()));

    if cli.dry_run {
        let params = match &command {
            Command::Crawl(args) => args.apply(CrawlParams::from_config(&config)),
            _ => CrawlParams::from_config(&config),
        };
        handle_dry_run(&config, &params);
        return Ok(());
    }

    match command {
        Command::Crawl(args) => handle_crawl(&config, &config_hash, &args).await,
        Command::Statuses => handle_statuses(&config).await,
        Command::Organizations => handle_organizations(&config).await,
        Command::Questions { law_id } => handle_questions(&config, law_id).await,
        Command::Suggest { law_id } => handle_suggest(&config, law_id).await,
        Command::Articles { path } => handle_articles(&path),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("lexcrawl=info,warn"),
            1 => EnvFilter::new("lexcrawl=debug,info"),
            2 => EnvFilter::new("lexcrawl=trace,debug"),
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

/// Handles --dry-run: shows the resolved crawl parameters and endpoints
fn handle_dry_run(config: &Config, params: &CrawlParams) {
    println!("=== lexcrawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Window: {} .. {}", params.start_date, params.end_date);
    println!("  Workers: {}", params.num_workers);
    println!("  Output: {}", params.output_path.display());
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (disabled)"),
    }

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nEndpoints ({}):", config.endpoints.len());
    for (name, endpoint) in config.endpoints.iter() {
        println!("  - {} ({:?} {})", name, endpoint.method, endpoint.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, args: &CrawlArgs) -> anyhow::Result<()> {
    let params = args.apply(CrawlParams::from_config(config));
    tracing::info!(
        "Crawling {} .. {} with {} workers",
        params.start_date,
        params.end_date,
        params.num_workers
    );

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after in-flight requests");
            on_signal.cancel();
        }
    });

    let report = run_crawl(config, config_hash, &params, cancel)
        .await
        .context("crawl failed")?;

    print_report(&report);
    Ok(())
}

async fn handle_statuses(config: &Config) -> anyhow::Result<()> {
    let client = LawClient::from_config(config)?;
    let statuses = client.fetch_statuses().await?;
    println!("{}", serde_json::to_string_pretty(&statuses)?);
    Ok(())
}

async fn handle_organizations(config: &Config) -> anyhow::Result<()> {
    let client = LawClient::from_config(config)?;
    let organizations = client.fetch_organizations().await?;
    println!("{}", serde_json::to_string_pretty(&organizations)?);
    Ok(())
}

async fn handle_questions(config: &Config, law_id: i64) -> anyhow::Result<()> {
    let client = LawClient::from_config(config)?;
    let pairs = client.fetch_related_questions(law_id).await?;
    println!("{}", serde_json::to_string_pretty(&pairs)?);
    Ok(())
}

async fn handle_suggest(config: &Config, law_id: i64) -> anyhow::Result<()> {
    let client = LawClient::from_config(config)?;
    match client.fetch_suggestions(law_id).await? {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("No suggestions for document {}", law_id),
    }
    Ok(())
}

/// Handles `articles`: prints each stored document's articles as JSON
fn handle_articles(path: &std::path::Path) -> anyhow::Result<()> {
    let records = read_json(path).with_context(|| format!("failed to read {}", path.display()))?;

    let documents: Vec<serde_json::Value> = records
        .iter()
        .map(|record| {
            serde_json::json!({
                "id": record.id,
                "code": record.code,
                "articles": text::process(&record.content),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}
