//! matthes-seitz-catalog main entry point
//!
//! This is the command-line interface for the catalog scraper.

use anyhow::Context;
use clap::Parser;
use matthes_seitz_catalog::catalog::{Catalog, CatalogReport, Throttle};
use matthes_seitz_catalog::config::{resolve_config, Config};
use matthes_seitz_catalog::model::Imprint;
use matthes_seitz_catalog::output::{
    print_statistics, write_catalog, write_catalog_to, CatalogStatistics,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  matthes-seitz-catalog                                   # Full scrape -> catalog.json
  matthes-seitz-catalog --output books.json               # Custom output file
  matthes-seitz-catalog --limit 10                        # Test with 10 titles
  matthes-seitz-catalog --imprints friedenauer-presse     # Single imprint
  matthes-seitz-catalog --stdout | jq '.[] | .title'      # Pipe to jq";

/// Scrape the Matthes & Seitz Berlin book catalog as JSON
///
/// Covers all imprints: Matthes & Seitz Berlin, Friedenauer Presse and
/// August Verlag. Requests are paced at one per second for listing pages and
/// two per second for detail pages.
#[derive(Parser, Debug)]
#[command(name = "matthes-seitz-catalog")]
#[command(version)]
#[command(about = "Scrape the Matthes & Seitz Berlin book catalog as JSON", long_about = None)]
#[command(after_help = EXAMPLES)]
struct Cli {
    /// Output JSON file path (default: catalog.json)
    #[arg(short, long, value_name = "PATH", conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write JSON to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Limit number of titles to scrape (for testing)
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Imprints to scrape (default: all)
    #[arg(long, value_name = "SLUG", num_args = 1..)]
    imprints: Option<Vec<Imprint>>,

    /// Optional TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress logging and statistics
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so that `--stdout` output can be piped.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("matthes_seitz_catalog=info,warn"),
            1 => EnvFilter::new("matthes_seitz_catalog=debug,info"),
            2 => EnvFilter::new("matthes_seitz_catalog=trace,debug"),
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

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let (config, config_hash) =
        resolve_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let (Some(path), Some(hash)) = (&cli.config, &config_hash) {
        tracing::info!("Configuration loaded from {} (hash: {})", path.display(), hash);
    }

    let imprints = select_imprints(&cli, &config);
    tracing::info!(
        "Imprints: {}",
        imprints
            .iter()
            .map(Imprint::slug)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let stop = Arc::new(AtomicBool::new(false));
    spawn_interrupt_handler(Arc::clone(&stop));

    let catalog = Catalog::from_config(&config)
        .context("Failed to set up the HTTP client")?
        .with_stop_flag(stop);
    let mut throttle = Throttle::real();
    let report = catalog.run(&imprints, cli.limit, &mut throttle).await;

    if report.records.is_empty() && cli.limit != Some(0) {
        tracing::error!("No books scraped");
        return Ok(ExitCode::FAILURE);
    }

    if !cli.quiet {
        print_statistics(&CatalogStatistics::from_report(&report));
    }

    if cli.stdout {
        write_catalog_to(&report.records, std::io::stdout().lock())
            .context("Failed to write JSON to stdout")?;
    } else {
        let path = cli
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.output.path));
        write_catalog(&report.records, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(exit_code(&report))
}

/// Command line selection wins over the config file; the default is every imprint
fn select_imprints(cli: &Cli, config: &Config) -> Vec<Imprint> {
    let requested = cli
        .imprints
        .clone()
        .or_else(|| config.output.imprints.clone())
        .unwrap_or_else(|| Imprint::ALL.to_vec());

    let mut imprints = Vec::with_capacity(requested.len());
    for imprint in requested {
        if !imprints.contains(&imprint) {
            imprints.push(imprint);
        }
    }
    imprints
}

/// Exit status used when a second Ctrl-C aborts the process
const INTERRUPT_EXIT_CODE: i32 = 130;

/// Sets the stop flag on Ctrl-C; the run ends at the next page boundary.
/// A second Ctrl-C exits immediately.
fn spawn_interrupt_handler(stop: Arc<AtomicBool>) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if record_interrupt(&stop) {
                tracing::warn!("Second interrupt, exiting without writing output");
                std::process::exit(INTERRUPT_EXIT_CODE);
            }
            tracing::warn!(
                "Interrupt received, finishing after the current page (Ctrl-C again to abort)"
            );
        }
    });
}

/// Raises the stop flag; returns true if it was already raised
fn record_interrupt(stop: &AtomicBool) -> bool {
    stop.swap(true, Ordering::Relaxed)
}

/// Incomplete imprints make the run fail after the output is written
fn exit_code(report: &CatalogReport) -> ExitCode {
    for failure in &report.failed_imprints {
        tracing::error!(
            "Imprint {} is incomplete ({} records before failure): {}",
            failure.imprint,
            failure.records_before_failure,
            failure.error
        );
    }

    if report.is_complete() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
