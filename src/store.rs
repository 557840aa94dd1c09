//! Durable snapshot of one run: the aggregated document and the report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::{DOCUMENT_FILE, REPORT_FILE};
use crate::models::AggregationResult;

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn document_path(&self) -> PathBuf {
        self.dir.join(DOCUMENT_FILE)
    }

    pub fn report_path(&self) -> PathBuf {
        self.dir.join(REPORT_FILE)
    }

    /// Write the aggregated document as pretty JSON.
    pub fn write_document(&self, tasks: &AggregationResult) -> Result<PathBuf> {
        let content =
            serde_json::to_string_pretty(tasks).context("Failed to serialize document")?;
        let path = self.document_path();
        write_atomic(&path, content.as_bytes())?;
        tracing::info!(path = %path.display(), tasks = tasks.len(), "document written");
        Ok(path)
    }

    /// Load a previously written document.
    pub fn read_document(path: &Path) -> Result<AggregationResult> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        let tasks = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse document {}", path.display()))?;
        Ok(tasks)
    }

    pub fn write_report(&self, report: &str) -> Result<PathBuf> {
        let path = self.report_path();
        write_atomic(&path, report.as_bytes())?;
        tracing::info!(path = %path.display(), "report written");
        Ok(path)
    }
}

/// Write through a sibling temp file so readers never see a partial file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, content).with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to move {}", path.display()));
    }
    Ok(())
}
