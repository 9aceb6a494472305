//! Conversion of raw netperf logs into a JSON array of run records.

use crate::config::ReportSettings;
use crate::{parser, RunRecord};
use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Parses a directory of raw netperf logs into run records.
pub struct ResultConverter {
    settings: ReportSettings,
}

impl ResultConverter {
    pub fn new(settings: ReportSettings) -> Self {
        Self { settings }
    }

    /// Parse every recognized log file in `dir`, in file-name order.
    ///
    /// A malformed log is logged at warn level and skipped; the batch
    /// continues. An unreadable directory or an empty result set is fatal.
    pub fn load_directory(&self, dir: &Path) -> Result<Vec<RunRecord>> {
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
        for path in &paths {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
                match self.load_archive(path) {
                    Ok(mut batch) => records.append(&mut batch),
                    Err(err) => warn!("skipping {}: {:#}", path.display(), err),
                }
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !self.settings.is_log_extension(ext) {
                debug!("skipping {} (extension not recognized)", path.display());
                continue;
            }

            match self.load_file(path) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping {}: {:#}", path.display(), err),
            }
        }

        if records.is_empty() {
            bail!("no parseable netperf logs found in {}", dir.display());
        }
        info!("parsed {} of {} files in {}", records.len(), paths.len(), dir.display());
        Ok(records)
    }

    fn load_file(&self, path: &Path) -> Result<RunRecord> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        parser::parse_log(&content, name)
    }

    /// Parse every recognized log entry inside a gzipped tarball, the way
    /// collectors ship a whole result directory as one archive.
    fn load_archive(&self, path: &Path) -> Result<Vec<RunRecord>> {
        let file = fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));

        let mut records = Vec::new();
        let entries = archive
            .entries()
            .with_context(|| format!("{} is not a gzipped tar archive", path.display()))?;
        for entry in entries {
            let mut entry =
                entry.with_context(|| format!("corrupt entry in {}", path.display()))?;
            let name = match entry.path() {
                Ok(p) => match p.file_name().and_then(|n| n.to_str()) {
                    Some(n) => n.to_string(),
                    None => continue,
                },
                Err(_) => continue,
            };
            let ext = Path::new(&name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if !self.settings.is_log_extension(ext) {
                debug!("skipping archive entry {} (extension not recognized)", name);
                continue;
            }

            let mut content = String::new();
            if let Err(err) = entry.read_to_string(&mut content) {
                warn!("skipping archive entry {}: {}", name, err);
                continue;
            }
            match parser::parse_log(&content, &name) {
                Ok(record) => records.push(record),
                Err(err) => warn!("skipping archive entry {}: {:#}", name, err),
            }
        }
        Ok(records)
    }

    /// Write the records as a pretty-printed JSON array.
    pub fn write_json(&self, records: &[RunRecord], output: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(records)?;
        fs::write(output, content)
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!("wrote {} records to {}", records.len(), output.display());
        Ok(())
    }
}
