//! Output module for clippings and run reports
//!
//! This module handles:
//! - Writing one Markdown clipping per link
//! - Recording per-link outcomes and the failure report
//! - Summarizing a run for the console
//! - Clearing an output directory between runs

mod document;
mod outcome;
mod report;
pub mod stats;

pub use document::{
    render_front_matter, sanitize_file_name, DocumentWriter, WriteError, CLIPPINGS_DIR,
};
pub use outcome::{CrawlOutcome, FailureKind};
pub use report::ResultsWriter;
pub use stats::{print_summary, RunSummary};

use std::io;
use std::path::{Path, PathBuf};

/// Removes an output directory and everything in it
///
/// Returns the absolute path that was cleared. A directory that does not
/// exist counts as already cleared.
pub fn clear_output_dir(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    match std::fs::remove_dir_all(&absolute) {
        Ok(()) => {
            tracing::debug!("Cleared {}", absolute.display());
            Ok(absolute)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("Nothing to clear at {}", absolute.display());
            Ok(absolute)
        }
        Err(e) => Err(e),
    }
}
