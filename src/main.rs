//! Doc-Harvest main entry point
//!
//! This is the command-line interface for the Doc-Harvest documentation scraper.

use anyhow::Context;
use clap::Parser;
use doc_harvest::config::{load_config_with_hash, ScraperFile};
use doc_harvest::crawler::HttpTransport;
use doc_harvest::events::TracingSink;
use doc_harvest::output::{print_statistics, JsonLinesWriter, OutputError, PageOutput};
use doc_harvest::site::HtmlSiteHooks;
use doc_harvest::version::VersionFetcher;
use doc_harvest::Scraper;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Doc-Harvest: a documentation site scraper
///
/// Doc-Harvest crawls one documentation site breadth-first, runs every page
/// through the configured filter stacks, and writes one JSON record per page.
#[derive(Parser, Debug)]
#[command(name = "doc-harvest")]
#[command(version)]
#[command(about = "A documentation site scraper", long_about = None)]
struct Cli {
    /// Path to TOML scraper file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write page records to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Build a single page (path relative to the base URL) and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "check_version"])]
    page: Option<String>,

    /// Validate the scraper file and show what would be crawled
    #[arg(long, conflicts_with = "check_version")]
    dry_run: bool,

    /// Compare the documented release with the latest upstream version
    #[arg(long)]
    check_version: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading scraper file from: {}", cli.config.display());
    let (file, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Scraper file loaded successfully (hash: {})", hash);

    let scraper = build_scraper(&file)?;

    if cli.dry_run {
        handle_dry_run(&scraper)
    } else if cli.check_version {
        handle_check_version(&scraper).await
    } else if let Some(path) = cli.page.as_deref() {
        handle_page(&scraper, path, cli.out).await
    } else {
        handle_crawl(&scraper, cli.out).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("doc_harvest=info,warn"),
            1 => EnvFilter::new("doc_harvest=debug,info"),
            2 => EnvFilter::new("doc_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn build_scraper(file: &ScraperFile) -> anyhow::Result<Scraper> {
    let mut hooks = HtmlSiteHooks::new();
    if let Some(source) = &file.latest_version {
        hooks = hooks.with_latest_version(source.clone());
    }

    let scraper = Scraper::builder(file.into_config()?)
        .transport(Arc::new(HttpTransport::new(&file.user_agent)?))
        .hooks(Arc::new(hooks))
        .settings(file.crawl.clone())
        .event_sink(Arc::new(TracingSink))
        .build()?;

    Ok(scraper)
}

fn open_output(out: Option<PathBuf>) -> anyhow::Result<JsonLinesWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = match out {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(JsonLinesWriter::new(writer))
}

/// Handles the --dry-run mode: shows the resolved URLs and filter stacks
fn handle_dry_run(scraper: &Scraper) -> anyhow::Result<()> {
    let config = scraper.config();
    println!("=== Doc-Harvest Dry Run ===\n");

    println!("Scraper:");
    println!("  Name: {}", config.name());
    println!("  Slug: {}", config.slug());
    println!("  Release: {}", config.release().unwrap_or("-"));
    println!("  Base URL: {}", config.base_url());
    println!("  Root URL: {}", scraper.root_url());

    println!("\nInitial URLs ({}):", scraper.initial_urls().len());
    for url in scraper.initial_urls() {
        println!("  - {}", url);
    }

    let pipeline = scraper.pipeline()?;
    println!("\nHTML filters: {}", config.html_filters().names().join(", "));
    println!("Text filters: {}", config.text_filters().names().join(", "));
    tracing::debug!("Resolved pipeline: {:?}", pipeline);

    let settings = scraper.settings();
    println!("\nCrawl:");
    println!("  Max concurrent requests: {}", settings.max_concurrent_requests);
    println!("  Rescue errors: {}", settings.rescue_errors);
    println!("  Strategy: {:?}", settings.strategy);

    println!("\n✓ Scraper file is valid");
    Ok(())
}

/// Handles the --check-version mode
async fn handle_check_version(scraper: &Scraper) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let mut fetcher = VersionFetcher::new(client);
    if let Ok(token) = std::env::var("GITHUB_TOKEN") {
        fetcher = fetcher.with_github_token(token);
    }

    match scraper.check_outdated(&fetcher).await? {
        Some(true) => println!("{} is outdated", scraper.config().name()),
        Some(false) => println!("{} is up to date", scraper.config().name()),
        None => println!("{}: no version to compare", scraper.config().name()),
    }
    Ok(())
}

/// Handles the --page mode: builds one page
async fn handle_page(scraper: &Scraper, path: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let mut output = open_output(out)?;

    match scraper.build_page(path).await? {
        Some(page) => {
            output.write_page(&page)?;
            output.into_inner().flush()?;
        }
        None => tracing::warn!("{} was not processed", scraper.url_for(path)),
    }
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(scraper: &Scraper, out: Option<PathBuf>) -> anyhow::Result<()> {
    let mut output = open_output(out)?;
    let mut write_error: Option<OutputError> = None;

    let stats = scraper
        .build_pages(|page| {
            if write_error.is_none() {
                if let Err(e) = output.write_page(&page) {
                    write_error = Some(e);
                }
            }
        })
        .await
        .context("Crawl failed")?;

    if let Some(e) = write_error {
        return Err(e).context("Failed to write page records");
    }

    output.finalize(&stats)?;
    tracing::info!("Wrote {} page records", output.written());
    print_statistics(&stats);

    Ok(())
}
