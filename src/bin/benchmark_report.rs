//! Compare a baseline CSV report against a test CSV report.

use anyhow::Result;
use clap::Parser;
use netperf_report::compare::BenchmarkComparator;
use netperf_report::config::ReportSettings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "netperf-benchmark-report")]
#[command(about = "Compute per-metric deltas between a baseline and a test CSV report")]
struct Cli {
    /// Baseline CSV report
    #[arg(long = "base_csv")]
    base_csv: PathBuf,

    /// Test CSV report to compare against the baseline
    #[arg(long = "test_csv")]
    test_csv: PathBuf,

    /// Output CSV file for the comparison
    #[arg(long = "report_csv")]
    report_csv: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "benchmark_report={},netperf_report={}",
            log_level, log_level
        ))
        .with_target(false)
        .init();

    let settings = ReportSettings::load(cli.config.as_deref())?;

    let comparator = BenchmarkComparator::new(settings);
    let base = comparator.read_rows(&cli.base_csv)?;
    let test = comparator.read_rows(&cli.test_csv)?;
    let rows = comparator.compare(&base, &test);
    comparator.write_csv(&rows, &cli.report_csv)?;
    Ok(())
}
