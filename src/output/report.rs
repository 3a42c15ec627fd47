//! Failure report writer
//!
//! Only failed outcomes are written. With no failures the report file is
//! still created, empty, so a stale report from an earlier run never lingers.

use crate::output::outcome::CrawlOutcome;
use crate::output::stats::RunSummary;
use crate::ClipperError;
use std::path::{Path, PathBuf};

/// Writes failed outcomes as CSV
#[derive(Debug, Clone)]
pub struct ResultsWriter {
    output_path: PathBuf,
}

impl ResultsWriter {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.output_path
    }

    /// Writes every failed outcome and returns the run summary
    ///
    /// Columns: `title,url,time_added,tags,status,success,error`.
    pub fn write_results(&self, outcomes: &[CrawlOutcome]) -> Result<RunSummary, ClipperError> {
        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.output_path).map_err(|e| self.report_error(e))?;

        let failed: Vec<&CrawlOutcome> = outcomes.iter().filter(|o| !o.success).collect();
        for outcome in &failed {
            writer.serialize(outcome).map_err(|e| self.report_error(e))?;
        }
        writer.flush()?;

        tracing::debug!(
            "Wrote {} failed links to {}",
            failed.len(),
            self.output_path.display()
        );

        Ok(RunSummary::from_outcomes(outcomes))
    }

    fn report_error(&self, source: csv::Error) -> ClipperError {
        ClipperError::Report {
            path: self.output_path.clone(),
            source,
        }
    }
}
