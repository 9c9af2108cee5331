// src/main.rs
mod config;
mod events;
mod orgs;
mod pipeline;
mod storage;
mod utils;
mod web;

use std::path::PathBuf;

use clap::Parser;
use config::{AppConfig, ResolverMode};
use events::EventBlockExtractor;
use orgs::{source, OrganizationClassifier};
use pipeline::{ExtractionPipeline, OrganizationStatus, PipelineReport};
use storage::StorageManager;
use utils::AppError;
use web::{HttpFetcher, PageFetcher, QueryTemplateResolver, SearchLinkResolver, WebsiteResolver};

/// Command Line Interface for the seasonal event scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Organization list CSV (needs `Organization` and `Category` columns); repeat for several
    #[arg(short = 'i', long = "orgs", required = true)]
    orgs: Vec<PathBuf>,

    /// Optional JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory for the event table and run metadata
    #[arg(short, long, default_value = "./output")]
    output_dir: PathBuf,

    /// Name of the event table file (defaults to one derived from the window)
    #[arg(long)]
    output_file: Option<String>,

    /// First day of the reporting window (YYYY-MM-DD), overrides config
    #[arg(long)]
    window_start: Option<String>,

    /// Last day of the reporting window (YYYY-MM-DD), overrides config
    #[arg(long)]
    window_end: Option<String>,

    /// How to find each organization's website, overrides config
    #[arg(long, value_enum)]
    resolver: Option<ResolverMode>,

    /// User-Agent header sent with every request, overrides config
    #[arg(long)]
    user_agent: Option<String>,

    /// Debug mode - save raw and annotated copies of every fetched page
    #[arg(short, long)]
    debug: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &Args) -> Result<AppConfig, AppError> {
    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if let Some(start) = &args.window_start {
        config.window.start = config::parse_cli_date(start)?;
    }
    if let Some(end) = &args.window_end {
        config.window.end = config::parse_cli_date(end)?;
    }
    if let Some(mode) = args.resolver {
        config.resolver.mode = mode;
    }
    if let Some(user_agent) = &args.user_agent {
        config.fetch.user_agent = user_agent.clone();
    }
    Ok(config)
}

async fn run_with<R: WebsiteResolver, F: PageFetcher>(
    resolver: R,
    fetcher: F,
    extractor: EventBlockExtractor,
    debug_dir: Option<PathBuf>,
    organizations: &[orgs::OrganizationRecord],
) -> PipelineReport {
    let mut pipeline = ExtractionPipeline::new(resolver, fetcher, extractor);
    if let Some(dir) = debug_dir {
        pipeline = pipeline.with_debug_dir(dir);
    }
    pipeline.run(organizations).await
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.verbose);
    tracing::info!("Starting processing for args: {:?}", args);

    // 3. Configuration
    let config = build_config(&args)?;
    let window = config.reporting_window()?;
    tracing::info!("Reporting window: {} to {}", window.start(), window.end());

    // 4. Load and classify organizations
    let rows = source::load_organization_lists(&args.orgs)?;
    let organizations = OrganizationClassifier::new(config.categories.clone()).classify(rows);
    if organizations.is_empty() {
        tracing::warn!("No organizations in scope; the event table will be empty");
    }

    // 5. Initialize storage and extractor
    let storage = StorageManager::new(&args.output_dir)?;
    tracing::info!("Output directory: {}", storage.base_dir().display());
    let extractor = EventBlockExtractor::new(&config.vocabulary, window)?;
    let debug_dir = args.debug.then(|| args.output_dir.join("debug"));

    // 6. Run the pipeline
    let fetcher = HttpFetcher::new(&config.fetch)?;
    let report = match config.resolver.mode {
        ResolverMode::Query => {
            let resolver = QueryTemplateResolver::new(&config.resolver);
            run_with(resolver, fetcher, extractor, debug_dir, &organizations).await
        }
        ResolverMode::Search => {
            let resolver = SearchLinkResolver::new(HttpFetcher::new(&config.fetch)?, &config.resolver);
            run_with(resolver, fetcher, extractor, debug_dir, &organizations).await
        }
    };

    for outcome in &report.outcomes {
        match &outcome.status {
            OrganizationStatus::Extracted(_) => {}
            OrganizationStatus::NoWebsite => tracing::info!("No website found: {}", outcome.organization),
            OrganizationStatus::NoContent => tracing::warn!(
                "No content: {} ({})",
                outcome.organization,
                outcome.website.as_deref().unwrap_or("-")
            ),
            OrganizationStatus::FetchFailed(reason) => {
                tracing::warn!("Failed: {}: {}", outcome.organization, reason)
            }
        }
    }

    // 7. Export
    let file_name = args
        .output_file
        .clone()
        .unwrap_or_else(|| StorageManager::default_file_name(&window));
    let table_path = storage.save_events(&report.events, &file_name)?;
    match storage.save_run_metadata(&report, &window, organizations.len(), &file_name) {
        Ok(path) => tracing::info!("Saved run metadata to: {}", path.display()),
        Err(e) => tracing::error!("Failed to save run metadata: {}", e),
    }

    tracing::info!(
        "Event scraping complete! {} events from {} organizations saved to {}",
        report.events.len(),
        organizations.len(),
        table_path.display()
    );

    Ok(())
}
