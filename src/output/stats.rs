//! Run statistics
//!
//! This module summarizes a batch's outcomes for the console.

use crate::output::outcome::{CrawlOutcome, FailureKind};
use std::collections::BTreeMap;
use std::fmt;

/// Counts for one completed batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Links attempted
    pub total: usize,

    /// Links whose clipping was written
    pub succeeded: usize,

    pub failed: usize,

    /// Failed links by the stage they stopped at
    pub failures_by_kind: BTreeMap<FailureKind, usize>,
}

impl RunSummary {
    pub fn from_outcomes(outcomes: &[CrawlOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            if outcome.success {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
                let kind = outcome.failure.unwrap_or(FailureKind::Aborted);
                *summary.failures_by_kind.entry(kind).or_insert(0) += 1;
            }
        }

        summary
    }

    /// Percentage of links written, 0 for an empty batch
    pub fn success_rate(&self) -> f64 {
        if self.total > 0 {
            (self.succeeded as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total URLs Crawled: {}", self.total)?;
        writeln!(f, "Successful URLs: {}", self.succeeded)?;
        write!(f, "Failed URLs: {}", self.failed)
    }
}

/// Prints the summary to stdout, with a per-stage breakdown of failures
pub fn print_summary(summary: &RunSummary) {
    println!("{}", summary);

    if !summary.failures_by_kind.is_empty() {
        println!();
        println!("Failures by Stage:");
        for (kind, count) in &summary.failures_by_kind {
            println!("  {}: {}", kind, count);
        }
    }

    println!();
    println!(
        "Success Rate: {:.1}% ({} / {} links clipped)",
        summary.success_rate(),
        summary.succeeded,
        summary.total
    );
}
