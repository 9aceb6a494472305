//! Settings shared by the report pipeline binaries.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for conversion and report generation, loadable from a TOML
/// file with environment-variable overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Decimal digits kept for metric values and deltas.
    pub round_digits: u32,
    /// File extensions treated as raw netperf logs.
    pub log_extensions: Vec<String>,
    /// Sort report rows by (type, direction, msize, round) before writing.
    pub sort_report_rows: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            round_digits: 4,
            log_extensions: vec![
                "log".to_string(),
                "txt".to_string(),
                "netperf".to_string(),
            ],
            sort_report_rows: true,
        }
    }
}

impl ReportSettings {
    /// Load settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(settings)
    }

    /// Resolve settings from an optional config path, then apply
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(digits) = std::env::var("NETPERF_REPORT_ROUND_DIGITS") {
            self.round_digits = digits.parse().unwrap_or(self.round_digits);
        }
        if let Ok(sort) = std::env::var("NETPERF_REPORT_SORT") {
            self.sort_report_rows = sort.parse().unwrap_or(self.sort_report_rows);
        }
    }

    /// Whether a file extension names a raw netperf log.
    pub fn is_log_extension(&self, ext: &str) -> bool {
        self.log_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}
