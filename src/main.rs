//! Recipe-Consensus main entry point
//!
//! This is the command-line interface for the recipe aggregator.

use anyhow::Context;
use clap::Parser;
use recipe_consensus::config::{load_config_with_hash, Config};
use recipe_consensus::crawler::Coordinator;
use recipe_consensus::output::{
    format_statistics, JsonReportWriter, MarkdownReportWriter, RecipeReport, ReportWriter,
};
use recipe_consensus::search::{build_search_client, CandidateUrl, CustomSearchProvider};
use recipe_consensus::{AggregationRequest, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Recipe-Consensus: cross-recipe ingredient statistics
///
/// Fetches recipe pages for a search query (or an explicit URL list),
/// extracts their schema.org Recipe data, and marks which ingredients
/// most recipes agree on and which set a recipe apart.
#[derive(Parser, Debug)]
#[command(name = "recipe-consensus")]
#[command(version = "1.0.0")]
#[command(about = "Cross-recipe ingredient statistics", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Search query used to find candidate recipe pages
    #[arg(long, required_unless_present = "url", conflicts_with = "url")]
    query: Option<String>,

    /// Candidate page URL, repeatable; ranked by position
    #[arg(long)]
    url: Vec<String>,

    /// Maximum number of recipes to aggregate
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    limit: Option<u64>,

    /// Sort criterion forwarded to the sorting service
    #[arg(long)]
    sort: Option<String>,

    /// Also write a Markdown report to this path
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,

    /// Validate config and show what would be fetched without any network access
    #[arg(long)]
    dry_run: bool,

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

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let request = build_request(&cli, &config);

    if cli.dry_run {
        return handle_dry_run(&config, &request);
    }

    handle_aggregate(&config, &request, cli.summary.as_ref(), cli.quiet).await;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only the JSON report.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("recipe_consensus=info,warn"),
            1 => EnvFilter::new("recipe_consensus=debug,info"),
            2 => EnvFilter::new("recipe_consensus=trace,debug"),
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

fn build_request(cli: &Cli, config: &Config) -> AggregationRequest {
    let limit = cli
        .limit
        .map(|limit| limit as usize)
        .unwrap_or(config.fan_out.default_limit);

    let request = match &cli.query {
        Some(query) => AggregationRequest::query(query.as_str(), limit),
        None => AggregationRequest::urls(cli.url.iter().cloned(), limit),
    };

    match &cli.sort {
        Some(criterion) => request.with_sort(criterion.as_str()),
        None => request,
    }
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config, request: &AggregationRequest) -> anyhow::Result<()> {
    use recipe_consensus::CandidateSource;

    println!("=== Recipe-Consensus Dry Run ===\n");

    println!("Fan-out:");
    println!("  Limit: {}", request.limit);
    println!("  Max candidates: {}", config.fan_out.max_candidates);
    println!("  Sort: {}", request.sort.as_deref().unwrap_or("(rank order)"));

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.browser);

    println!("\nCollaborators:");
    println!(
        "  Normalizer: {}",
        config
            .normalizer
            .as_ref()
            .map_or("(pass-through)", |s| s.endpoint.as_str())
    );
    println!(
        "  Sorter: {}",
        config
            .sorter
            .as_ref()
            .map_or("(pass-through)", |s| s.endpoint.as_str())
    );

    println!("\nExcluded Domains ({}):", config.exclusions.len());
    for entry in &config.exclusions {
        println!("  - {}", entry.domain);
    }

    match &request.source {
        CandidateSource::Query(query) => {
            println!("\nSearch:");
            println!("  Query: {}", query);
            println!("  Endpoint: {}", config.search.endpoint);
            match CustomSearchProvider::from_config(&config.search, build_search_client()?) {
                Ok(_) => println!("  Credentials: configured"),
                Err(e) => println!("  Credentials: {}", e),
            }
        }
        CandidateSource::Urls(urls) => {
            let candidates = CandidateUrl::from_urls(urls.iter().cloned());
            let coordinator = Coordinator::new(config)?;
            let (dispatched, excluded) = coordinator.partition(&candidates);

            println!("\nWould dispatch ({}):", dispatched.len());
            for candidate in &dispatched {
                println!("  {}. {}", candidate.rank, candidate.url);
            }
            println!("\nWould exclude ({}):", excluded.len());
            for candidate in &excluded {
                println!("  {}. {}", candidate.rank, candidate.url);
            }
        }
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main aggregation run
///
/// Any failure is logged in full; the user sees only the stable message.
async fn handle_aggregate(
    config: &Config,
    request: &AggregationRequest,
    summary: Option<&PathBuf>,
    quiet: bool,
) {
    match aggregate(config, request, summary).await {
        Ok(report) => {
            if !quiet {
                eprint!("{}", format_statistics(&report.statistics));
            }
        }
        Err(e) => {
            tracing::error!("Aggregation failed: {}", e);
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

async fn aggregate(
    config: &Config,
    request: &AggregationRequest,
    summary: Option<&PathBuf>,
) -> recipe_consensus::Result<RecipeReport> {
    let pipeline = Pipeline::new(config)?;
    let report = pipeline.run(request).await?;

    JsonReportWriter::new(std::io::stdout().lock()).write_report(&report)?;

    if let Some(path) = summary {
        MarkdownReportWriter::new(path).write_report(&report)?;
        tracing::info!("Summary written to: {}", path.display());
    }

    Ok(report)
}
