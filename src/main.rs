//! founders-scraper main entry point
//!
//! This is the command-line interface for the polite startup scraper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use founders_scraper::config::{load_config_or_default, Config};
use founders_scraper::crawler::Scraper;
use founders_scraper::output::{
    export_csv, export_json, load_json_records, print_batch_summary, print_compliance,
    print_status, run_qa_pipeline, save_qa_report, setup_directories, timestamped_path,
    write_json,
};
use founders_scraper::state::ScrapingMetrics;
use founders_scraper::url::{load_url_list, parse_target_url, sample_url_list};
use founders_scraper::RateLimiter;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// URLs used by the `test` command, one per supported source
const TEST_URLS: [&str; 3] = [
    "https://www.crunchbase.com/organization/airbnb",
    "https://angel.co/company/airbnb",
    "https://www.producthunt.com/products/airbnb",
];

/// founders-scraper: a polite startup scraper
///
/// Extracts company records from Crunchbase, AngelList and Product Hunt
/// while respecting robots.txt, rate limits and courtesy hours.
#[derive(Parser, Debug)]
#[command(name = "founders-scraper")]
#[command(version = "1.0.0")]
#[command(about = "A polite web scraper for startups", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Wait for courtesy hours before scraping
    #[arg(long, global = true)]
    courtesy: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape one known URL per supported source
    Test,

    /// Check compliance for a URL and scrape it
    Single {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Scrape every URL listed in a file
    Batch {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Show session metrics and courtesy-hours status
    Status,

    /// Write a sample URL list to the data directory
    Sample,

    /// Run the robots.txt and terms-of-service check only
    Check {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Run the data-quality report over a JSON export
    Qa {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            match &cli.config {
                Some(path) => eprintln!("Failed to load configuration from {}: {}", path.display(), e),
                None => eprintln!("Invalid default configuration: {}", e),
            }
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_directories(&config.output) {
        eprintln!("Failed to create output directories: {}", e);
        return ExitCode::FAILURE;
    }

    // Setup logging based on verbosity
    let log_file = setup_logging(cli.verbose, cli.quiet, Path::new(&config.output.logs_dir));
    if let Some(path) = &log_file {
        tracing::debug!("Logging to {}", path.display());
    }

    match run(cli, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Filter for a verbosity level (-v, -vv, -vvv)
fn verbosity_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("founders_scraper=info,warn"),
        1 => EnvFilter::new("founders_scraper=debug,info"),
        2 => EnvFilter::new("founders_scraper=trace,debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Sets up console logging plus a `scraper_<timestamp>.log` file in `logs_dir`
///
/// `quiet` only silences the console; the file always gets the verbosity
/// level. Returns the log file path, or `None` when it could not be created.
fn setup_logging(verbose: u8, quiet: bool, logs_dir: &Path) -> Option<PathBuf> {
    let console_filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        verbosity_filter(verbose)
    };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_filter(console_filter);

    let (log_path, file_layer) = match create_log_file(logs_dir) {
        Ok((path, file)) => (
            Some(path),
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(verbosity_filter(verbose)),
            ),
        ),
        Err(e) => {
            eprintln!("Could not create log file in {}: {}", logs_dir.display(), e);
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    log_path
}

/// Creates `scraper_<timestamp>.log` in `logs_dir`
fn create_log_file(logs_dir: &Path) -> std::io::Result<(PathBuf, File)> {
    let path = timestamped_path(logs_dir, "scraper", "log");
    let file = File::create(&path)?;
    Ok((path, file))
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<bool> {
    match cli.command {
        Command::Status => {
            handle_status(&config).await;
            Ok(true)
        }
        Command::Sample => handle_sample(&config),
        Command::Qa { file } => handle_qa(&config, &file),
        Command::Check { url } => handle_check(&config, &url).await,
        Command::Test => {
            let scraper = build_scraper(&config, cli.courtesy).await?;
            handle_test(&config, &scraper).await
        }
        Command::Single { url } => {
            parse_target_url(&url)?;
            let scraper = build_scraper(&config, cli.courtesy).await?;
            handle_single(&config, &scraper, &url).await
        }
        Command::Batch { file, yes } => {
            let urls = load_url_list(&file)
                .with_context(|| format!("Error reading file {}", file.display()))?;
            handle_batch(&config, cli.courtesy, &urls, yes, &file).await
        }
    }
}

async fn build_scraper(config: &Config, courtesy: bool) -> anyhow::Result<Scraper> {
    let scraper = Scraper::from_config(config).context("Failed to build HTTP client")?;
    if courtesy {
        scraper.pipeline().limiter().wait_for_courtesy_hours().await;
    }
    Ok(scraper)
}

/// Handles the `test` command: one known URL per source
async fn handle_test(config: &Config, scraper: &Scraper) -> anyhow::Result<bool> {
    println!("=== Testing Scraper ===\n");
    println!("Testing with {} URLs...", TEST_URLS.len());
    println!("This may take a few minutes due to rate limiting.\n");

    let urls: Vec<String> = TEST_URLS.iter().map(|u| u.to_string()).collect();
    let outcome = scraper.scrape_batch(&urls).await;

    println!("\nResults:");
    println!("  Successful: {}", outcome.records.len());
    println!("  Errors: {}", outcome.failures.len());

    for record in &outcome.records {
        println!("  - {} ({}): {}", record.name, record.source, record.website);
    }
    for failure in &outcome.failures {
        println!("  ! {}: {}", failure.url, failure.error);
    }

    if !outcome.records.is_empty() {
        let path = timestamped_path(Path::new(&config.output.data_dir), "test_results", "json");
        export_json(&outcome.records, &path)?;
        println!("\nResults saved to: {}", path.display());
    }

    scraper.pipeline().metrics().log_status();
    Ok(!outcome.records.is_empty())
}

/// Handles the `single` command: compliance report, then scrape
async fn handle_single(config: &Config, scraper: &Scraper, url: &str) -> anyhow::Result<bool> {
    println!("=== Scraping Single URL ===\n");
    println!("Checking compliance...");

    let report = scraper.pipeline().compliance().comprehensive_check(url).await;
    print_compliance(&report);

    if !report.overall_allowed {
        println!("\nScraping not allowed by robots.txt");
        return Ok(false);
    }

    println!("\nStarting scrape...");
    let record = match scraper.scrape_url(url).await {
        Ok(record) => record,
        Err(e) => {
            println!("Failed: {}", e);
            return Ok(false);
        }
    };

    println!("\n=== Success ===");
    println!("Name: {}", record.name);
    println!("Website: {}", record.website);
    println!("Source: {}", record.source);
    println!(
        "Description: {}",
        record.description.chars().take(200).collect::<String>()
    );

    let path = timestamped_path(Path::new(&config.output.data_dir), "single_scrape", "json");
    write_json(&path, &record)?;
    println!("\nSaved to: {}", path.display());

    Ok(true)
}

/// Handles the `batch` command
async fn handle_batch(
    config: &Config,
    courtesy: bool,
    urls: &[String],
    yes: bool,
    file: &Path,
) -> anyhow::Result<bool> {
    println!("=== Batch Scraping ===\n");
    println!("Loaded {} URLs from {}", urls.len(), file.display());

    let Some(first) = urls.first() else {
        println!("No URLs found");
        return Ok(false);
    };
    println!("Example URL: {}", first);

    println!("\nThis will scrape {} URLs", urls.len());
    println!("This may take several minutes/hours depending on rate limiting.");
    if !yes && !confirm("Continue? (y/N): ")? {
        println!("Cancelled");
        return Ok(false);
    }

    let scraper = build_scraper(config, courtesy).await?;
    println!("\nStarting batch scrape...");
    let outcome = scraper.scrape_batch(urls).await;

    let exports = Path::new(&config.output.exports_dir);
    let results_file = timestamped_path(exports, "batch_results", "json");
    let csv_file = results_file.with_extension("csv");
    let errors_file = timestamped_path(exports, "batch_errors", "json");

    export_json(&outcome.records, &results_file)?;
    export_csv(&outcome.records, &csv_file)?;
    write_json(&errors_file, &outcome.failures)?;

    print_batch_summary(&outcome);
    scraper.pipeline().metrics().log_status();
    println!();
    print_status(
        &scraper.pipeline().metrics().snapshot(),
        scraper.pipeline().limiter(),
    )
    .await;

    println!("\nResults saved:");
    println!("  Success: {}", results_file.display());
    println!("  CSV: {}", csv_file.display());
    println!("  Errors: {}", errors_file.display());

    Ok(!outcome.records.is_empty())
}

/// Handles the `status` command
async fn handle_status(config: &Config) {
    let metrics = ScrapingMetrics::new();
    let limiter = RateLimiter::new(&config.rate_limit);
    print_status(&metrics.snapshot(), &limiter).await;
}

/// Handles the `sample` command
fn handle_sample(config: &Config) -> anyhow::Result<bool> {
    let path = Path::new(&config.output.data_dir).join("sample_urls.txt");
    std::fs::write(&path, sample_url_list())
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("Created sample file: {}", path.display());
    println!("Edit this file to add your own URLs and run:");
    println!("  founders-scraper batch {}", path.display());
    Ok(true)
}

/// Handles the `check` command: compliance only, no page scrape
async fn handle_check(config: &Config, url: &str) -> anyhow::Result<bool> {
    parse_target_url(url)?;
    let scraper = Scraper::from_config(config).context("Failed to build HTTP client")?;

    println!("=== Compliance Check ===\n");
    let report = scraper.pipeline().compliance().comprehensive_check(url).await;
    print_compliance(&report);

    Ok(report.overall_allowed)
}

/// Handles the `qa` command
fn handle_qa(config: &Config, file: &Path) -> anyhow::Result<bool> {
    let records = load_json_records(file)
        .with_context(|| format!("Failed to load records from {}", file.display()))?;

    let (results, report) = run_qa_pipeline(&records);
    let (md, json) = save_qa_report(&results, &report, None, Path::new(&config.output.logs_dir))?;

    println!("{}", report);
    println!("\nQA report saved: {}", md.display());
    println!("QA results saved: {}", json.display());

    Ok(results.validation.total_records > 0)
}

/// Asks a yes/no question on stdin
fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
