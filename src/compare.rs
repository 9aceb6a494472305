//! Baseline-versus-test comparison of two CSV reports.

use crate::config::ReportSettings;
use crate::report::ReportRow;
use crate::utils::format_metric;
use crate::{Direction, TestType};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Marker emitted when a delta cannot be computed (missing baseline key or
/// zero baseline value).
pub const UNAVAILABLE: &str = "unavailable";

/// Join key for matching a test row against the baseline.
pub type CompareKey = (TestType, u64, Direction);

/// One comparison row: the test measurement next to its baseline, with
/// absolute and percentage deltas. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    #[serde(rename = "type")]
    pub test_type: TestType,
    pub direction: Direction,
    pub msize: u64,
    pub unit: String,
    pub base_value: String,
    pub test_value: f64,
    pub diff: String,
    pub pct_change: String,
}

/// Computes per-metric deltas between a baseline report and a test report.
pub struct BenchmarkComparator {
    settings: ReportSettings,
}

impl BenchmarkComparator {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// Read report rows from a CSV file.
    pub fn read_rows(&self, path: &Path) -> Result<Vec<ReportRow>> {
        if !path.is_file() {
            bail!("input CSV {} does not exist", path.display());
        }
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let rows: Vec<ReportRow> = reader
            .deserialize()
            .collect::<Result<_, _>>()
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if rows.is_empty() {
            bail!("{} contains no report rows", path.display());
        }
        Ok(rows)
    }

    /// Build one benchmark row per test row, in test-report order.
    ///
    /// Duplicate keys in the baseline keep the last occurrence. A key
    /// missing from the baseline or a zero baseline value marks the delta
    /// fields unavailable instead of failing the run.
    pub fn compare(&self, base: &[ReportRow], test: &[ReportRow]) -> Vec<BenchmarkRow> {
        let baseline: HashMap<CompareKey, &ReportRow> = base
            .iter()
            .map(|row| ((row.test_type, row.msize, row.direction), row))
            .collect();

        let digits = self.settings.round_digits;
        test.iter()
            .map(|row| {
                let key = (row.test_type, row.msize, row.direction);
                let (base_value, diff, pct_change) = match baseline.get(&key) {
                    None => {
                        warn!(
                            "no baseline for {} msize {} ({})",
                            row.test_type, row.msize, row.direction
                        );
                        (
                            UNAVAILABLE.to_string(),
                            UNAVAILABLE.to_string(),
                            UNAVAILABLE.to_string(),
                        )
                    }
                    Some(base_row) if base_row.unit != row.unit => {
                        warn!(
                            "unit mismatch for {} msize {}: baseline {} vs test {}",
                            row.test_type, row.msize, base_row.unit, row.unit
                        );
                        (
                            format_metric(base_row.value, digits),
                            UNAVAILABLE.to_string(),
                            UNAVAILABLE.to_string(),
                        )
                    }
                    Some(base_row) => {
                        let diff = format_metric(row.value - base_row.value, digits);
                        let pct = if base_row.value == 0.0 {
                            UNAVAILABLE.to_string()
                        } else {
                            let pct = (row.value - base_row.value) / base_row.value * 100.0;
                            format_metric(pct, digits)
                        };
                        (format_metric(base_row.value, digits), diff, pct)
                    }
                };

                BenchmarkRow {
                    test_type: row.test_type,
                    direction: row.direction,
                    msize: row.msize,
                    unit: row.unit.clone(),
                    base_value,
                    test_value: row.value,
                    diff,
                    pct_change,
                }
            })
            .collect()
    }

    /// Serialize comparison rows to CSV at `output`.
    pub fn write_csv(&self, rows: &[BenchmarkRow], output: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(output)
            .with_context(|| format!("failed to create {}", output.display()))?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        info!("wrote {} benchmark rows to {}", rows.len(), output.display());
        Ok(())
    }

    /// Serialize comparison rows to any writer.
    pub fn write_csv_to<W: Write>(&self, rows: &[BenchmarkRow], writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(test_type: TestType, msize: u64, value: f64) -> ReportRow {
        ReportRow {
            test_type,
            direction: test_type.direction(),
            msize,
            ssize: 16384,
            round: Some(1),
            elapsed: 10.0,
            value,
            unit: test_type.unit().to_string(),
        }
    }

    fn comparator() -> BenchmarkComparator {
        BenchmarkComparator::new(ReportSettings::default())
    }

    #[test]
    fn pct_change_matches_definition() {
        let base = vec![row(TestType::TcpStream, 1024, 940.2)];
        let test = vec![row(TestType::TcpStream, 1024, 987.5)];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].base_value, "940.2");
        assert_eq!(rows[0].test_value, 987.5);
        assert_eq!(rows[0].diff, "47.3");
        assert_eq!(rows[0].pct_change, "5.0308");
    }

    #[test]
    fn missing_baseline_key_is_unavailable_not_fatal() {
        let base = vec![row(TestType::TcpStream, 1024, 940.2)];
        let test = vec![
            row(TestType::TcpStream, 1024, 987.5),
            row(TestType::UdpRr, 64, 18000.0),
        ];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].test_type, TestType::UdpRr);
        assert_eq!(rows[1].base_value, UNAVAILABLE);
        assert_eq!(rows[1].diff, UNAVAILABLE);
        assert_eq!(rows[1].pct_change, UNAVAILABLE);
    }

    #[test]
    fn zero_baseline_is_unavailable_not_nan() {
        let base = vec![row(TestType::UdpStream, 1024, 0.0)];
        let test = vec![row(TestType::UdpStream, 1024, 500.0)];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows[0].base_value, "0");
        assert_eq!(rows[0].diff, "500");
        assert_eq!(rows[0].pct_change, UNAVAILABLE);
    }

    #[test]
    fn output_follows_test_order() {
        let base = vec![
            row(TestType::TcpStream, 1024, 100.0),
            row(TestType::TcpRr, 1, 20000.0),
        ];
        let test = vec![
            row(TestType::TcpRr, 1, 21000.0),
            row(TestType::TcpStream, 1024, 110.0),
        ];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows[0].test_type, TestType::TcpRr);
        assert_eq!(rows[1].test_type, TestType::TcpStream);
    }

    #[test]
    fn duplicate_baseline_keys_keep_last() {
        let base = vec![
            row(TestType::TcpStream, 1024, 100.0),
            row(TestType::TcpStream, 1024, 200.0),
        ];
        let test = vec![row(TestType::TcpStream, 1024, 250.0)];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows[0].base_value, "200");
        assert_eq!(rows[0].pct_change, "25");
    }

    #[test]
    fn unit_mismatch_is_unavailable() {
        let mut mismatched = row(TestType::TcpStream, 1024, 100.0);
        mismatched.unit = "trans/s".to_string();
        let base = vec![mismatched];
        let test = vec![row(TestType::TcpStream, 1024, 110.0)];

        let rows = comparator().compare(&base, &test);
        assert_eq!(rows[0].base_value, "100");
        assert_eq!(rows[0].diff, UNAVAILABLE);
        assert_eq!(rows[0].pct_change, UNAVAILABLE);
    }

    #[test]
    fn comparison_is_deterministic() {
        let base = vec![
            row(TestType::TcpStream, 1024, 940.2),
            row(TestType::UdpStream, 1024, 0.0),
        ];
        let test = vec![
            row(TestType::TcpStream, 1024, 987.5),
            row(TestType::UdpStream, 1024, 500.0),
            row(TestType::UdpRr, 64, 18000.0),
        ];

        let cmp = comparator();
        let mut first = Vec::new();
        cmp.write_csv_to(&cmp.compare(&base, &test), &mut first).unwrap();
        let mut second = Vec::new();
        cmp.write_csv_to(&cmp.compare(&base, &test), &mut second).unwrap();
        assert_eq!(first, second);
    }
}
