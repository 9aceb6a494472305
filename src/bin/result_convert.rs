//! Convert raw netperf logs into a structured JSON document.

use anyhow::Result;
use clap::Parser;
use netperf_report::config::ReportSettings;
use netperf_report::convert::ResultConverter;
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(name = "result-convert")]
#[command(about = "Convert raw netperf logs into a JSON array of run records")]
struct Cli {
    /// Directory containing raw netperf log files
    #[arg(long = "result_path")]
    result_path: PathBuf,

    /// Output JSON file (defaults to <result_path>/netperf_results.json)
    #[arg(long = "output_json")]
    output_json: Option<PathBuf>,

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
            "result_convert={},netperf_report={}",
            log_level, log_level
        ))
        .with_target(false)
        .init();

    let settings = ReportSettings::load(cli.config.as_deref())?;

    let output = cli.output_json.unwrap_or_else(|| {
        let fallback = cli.result_path.join("netperf_results.json");
        warn!(
            "no output file (--output_json) specified, using {}",
            fallback.display()
        );
        fallback
    });

    let converter = ResultConverter::new(settings);
    let records = converter.load_directory(&cli.result_path)?;
    converter.write_json(&records, &output)?;
    Ok(())
}
