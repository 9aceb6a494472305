//! Flattening run records into the fixed-schema CSV report.

use crate::config::ReportSettings;
use crate::utils::round_to;
use crate::{parser, Direction, RunRecord, TestType};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, warn};

/// One run record flattened to a CSV row. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub direction: Direction,
    pub msize: u64,
    pub ssize: u64,
    pub round: Option<u32>,
    pub elapsed: f64,
    pub value: f64,
    pub unit: String,
}

impl ReportRow {
    pub fn from_record(record: &RunRecord, round_digits: u32) -> Self {
        Self {
            test_type: record.test_type,
            direction: record.direction,
            msize: record.message_size,
            ssize: record.socket_size,
            round: record.round,
            elapsed: round_to(record.elapsed_secs, round_digits),
            value: round_to(record.value, round_digits),
            unit: record.unit.clone(),
        }
    }
}

/// Builds the flat CSV report from a directory of results.
pub struct ReportGenerator {
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// Gather run records from `dir`: JSON documents written by the
    /// converter and raw netperf logs are both accepted. Per-file parse
    /// failures are logged and skipped.
    ///
    /// JSON documents are loaded first; a raw log whose name already
    /// appears as a record source is skipped, so a converter output living
    /// next to the logs it was built from does not double-count runs.
    pub fn collect(&self, dir: &Path) -> Result<Vec<RunRecord>> {
        if !dir.is_dir() {
            bail!("result path {} does not exist", dir.display());
        }

        let mut paths: Vec<_> = fs::read_dir(dir)
            .with_context(|| format!("failed to read result path {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut records = Vec::new();
        for path in paths.iter().filter(|p| has_extension(p, "json")) {
            match self.load_json(path) {
                Ok(mut batch) => records.append(&mut batch),
                Err(err) => warn!("skipping {}: {:#}", path.display(), err),
            }
        }
        let converted: HashSet<String> = records.iter().map(|r| r.source.clone()).collect();

        for path in &paths {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext.eq_ignore_ascii_case("json") {
                continue;
            }
            if !self.settings.is_log_extension(ext) {
                debug!("skipping {} (extension not recognized)", path.display());
                continue;
            }
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if converted.contains(name) {
                debug!("skipping {} (already converted)", path.display());
                continue;
            }

            match self.load_log(path) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping {}: {:#}", path.display(), err),
            }
        }

        if records.is_empty() {
            bail!("no parseable results found in {}", dir.display());
        }
        info!("collected {} records from {}", records.len(), dir.display());
        Ok(records)
    }

    fn load_json(&self, path: &Path) -> Result<Vec<RunRecord>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records: Vec<RunRecord> = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a run record array", path.display()))?;
        Ok(records)
    }

    fn load_log(&self, path: &Path) -> Result<RunRecord> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        parser::parse_log(&content, name)
    }

    /// Flatten records into rows, rounded and (by default) sorted the way
    /// the report is meant to be read.
    pub fn build_rows(&self, records: &[RunRecord]) -> Vec<ReportRow> {
        let mut rows: Vec<ReportRow> = records
            .iter()
            .map(|r| ReportRow::from_record(r, self.settings.round_digits))
            .collect();
        if self.settings.sort_report_rows {
            rows.sort_by(|a, b| {
                (a.test_type, a.direction, a.msize, a.round)
                    .cmp(&(b.test_type, b.direction, b.msize, b.round))
            });
        }
        rows
    }

    /// Serialize rows to CSV at `output`.
    pub fn write_csv(&self, rows: &[ReportRow], output: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("wrote {} report rows to {}", rows.len(), output.display());
        Ok(())
    }

    /// Serialize rows to any writer; used by tests.
    pub fn write_csv_to<W: Write>(&self, rows: &[ReportRow], writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}
