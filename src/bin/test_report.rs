//! Generate the flat CSV test report from a directory of results.

use anyhow::Result;
use clap::Parser;
use netperf_report::config::ReportSettings;
use netperf_report::report::ReportGenerator;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "netperf-test-report")]
#[command(about = "Flatten netperf run records into a fixed-schema CSV report")]
struct Cli {
    /// Directory containing converted JSON documents and/or raw logs
    #[arg(long = "result_path")]
    result_path: PathBuf,

    /// Output CSV file (defaults to <result_path>/netperf_report.csv)
    #[arg(long = "report_csv")]
    report_csv: Option<PathBuf>,

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
            "test_report={},netperf_report={}",
            log_level, log_level
        ))
        .with_target(false)
        .init();

    let settings = ReportSettings::load(cli.config.as_deref())?;

    let report_csv = cli.report_csv.unwrap_or_else(|| {
        let fallback = cli.result_path.join("netperf_report.csv");
        warn!(
            "no CSV file (--report_csv) specified, using {}",
            fallback.display()
        );
        fallback
    });

    let generator = ReportGenerator::new(settings);
    let records = generator.collect(&cli.result_path)?;
    let rows = generator.build_rows(&records);
    generator.write_csv(&rows, &report_csv)?;
    Ok(())
}
