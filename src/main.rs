//! Bucket Finder main entry point
//!
//! This is the command-line interface for the Bucket Finder bucket auditor.

use bucket_finder::candidates::{generate, load_wordlist};
use bucket_finder::config::{resolve_base_url, resolve_config, ScanSection};
use bucket_finder::output::{print_summary, ConsoleSink, LogSink};
use bucket_finder::{run_scan, CandidateSource, ScanConfig};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Bucket Finder: find publicly listable storage buckets
///
/// Bucket Finder expands seed keywords (or reads a wordlist) into candidate
/// bucket names, probes each one against a storage provider and reports the
/// buckets and objects that can be read anonymously.
#[derive(Parser, Debug)]
#[command(name = "bucket-finder")]
#[command(version)]
#[command(about = "Find publicly listable storage buckets", long_about = None)]
struct Cli {
    /// File with one bucket name per line
    #[arg(value_name = "WORDLIST", conflicts_with = "keyword")]
    wordlist: Option<PathBuf>,

    /// Seed keywords, separated by commas or spaces
    #[arg(short, long, value_name = "SEEDS")]
    keyword: Option<String>,

    /// Region code (us, ie, nc, si, to)
    #[arg(short, long)]
    region: Option<String>,

    /// Number of concurrent workers [default: 10]
    #[arg(short, long)]
    workers: Option<usize>,

    /// Delay before each probe, per worker, in milliseconds [default: 1000 / workers]
    #[arg(long, value_name = "MS")]
    rate_limit_ms: Option<u64>,

    /// Download readable objects
    #[arg(short, long)]
    download: bool,

    /// Append finding lines to this file
    #[arg(short, long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Directory that receives downloaded objects [default: .]
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Custom base URL, overrides the region (S3-compatible providers)
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Maximum redirects followed per candidate [default: 5]
    #[arg(long, value_name = "N")]
    max_redirect_depth: Option<u32>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv); -v also enables verbose findings
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress diagnostics and the final summary
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the candidate names and exit without probing
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Settings given as flags; unset flags leave room for the config file
    fn scan_section(&self) -> ScanSection {
        ScanSection {
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            workers: self.workers,
            rate_limit_ms: self.rate_limit_ms,
            download: self.download.then_some(true),
            output_dir: self.output_dir.clone(),
            log_file: self.log_file.clone(),
            max_redirect_depth: self.max_redirect_depth,
            timeout_secs: self.timeout,
            user_agent: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let source = CandidateSource::from_inputs(cli.keyword.as_deref(), cli.wordlist.as_deref())?;
    let config = match resolve_config(
        source,
        cli.config.as_deref(),
        cli.scan_section(),
        cli.verbose > 0,
    ) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_scan(config, cli.quiet).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Diagnostics go to stderr; stdout carries only findings.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bucket_finder=info,warn"),
            1 => EnvFilter::new("bucket_finder=debug,info"),
            2 => EnvFilter::new("bucket_finder=trace,debug"),
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

/// Handles the --dry-run mode: shows the settings and every candidate name
fn handle_dry_run(config: &ScanConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bucket Finder Dry Run ===\n");

    println!("Scan Configuration:");
    println!("  Endpoint: {}", resolve_base_url(config)?);
    println!("  Workers: {}", config.workers);
    println!("  Probe delay: {:?}", config.probe_delay());
    println!("  Max redirect depth: {}", config.max_redirect_depth);
    println!("  Timeout: {:?}", config.timeout);
    if config.download {
        println!("  Download to: {}", config.output_dir.display());
    }
    if let Some(log_file) = &config.log_file {
        println!("  Log file: {}", log_file.display());
    }

    let candidates: Vec<String> = match &config.source {
        CandidateSource::Keywords(seeds) => generate(seeds).into_iter().collect(),
        CandidateSource::Wordlist(path) => load_wordlist(path)?,
    };

    println!("\nCandidates ({}):", candidates.len());
    for name in &candidates {
        println!("  {}", name);
    }

    Ok(())
}

/// Handles the main scan operation
async fn handle_scan(config: ScanConfig, quiet: bool) -> Result<(), Box<dyn std::error::Error>> {
    let sink: Arc<dyn LogSink> = match &config.log_file {
        Some(path) => Arc::new(ConsoleSink::with_log_file(path)?),
        None => Arc::new(ConsoleSink::stdout()),
    };

    match run_scan(config, sink).await {
        Ok(summary) => {
            if !quiet {
                print_summary(&summary);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Scan failed: {}", e);
            Err(e.into())
        }
    }
}
