//! Per-link outcome records
//!
//! One [`CrawlOutcome`] is produced for every link handed to the crawler,
//! whatever happened to it. The serialized form is the failure report row.

use crate::links::LinkRecord;
use serde::Serialize;
use std::fmt;

/// Which stage a failed link stopped at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    /// Fetch deadline exceeded, or the batch was cancelled
    Timeout,
    /// Network, status or body errors while fetching
    Fetch,
    /// The content converter rejected the page
    Conversion,
    /// The clipping could not be written
    Write,
    /// The link's task ended without reporting (panic)
    Aborted,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Fetch => "fetch",
            Self::Conversion => "conversion",
            Self::Write => "write",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of processing one link
///
/// Link fields are flattened the way the export stores them: unix seconds
/// and pipe-joined tags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlOutcome {
    pub title: String,
    pub url: String,
    pub time_added: i64,
    pub tags: String,
    pub status: String,
    pub success: bool,
    /// Failure message, empty on success
    pub error: String,
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl CrawlOutcome {
    pub fn succeeded(link: &LinkRecord) -> Self {
        Self::from_link(link, None, String::new())
    }

    /// Records a failure, keeping `error`'s message verbatim
    pub fn failed(link: &LinkRecord, kind: FailureKind, error: impl fmt::Display) -> Self {
        Self::from_link(link, Some(kind), error.to_string())
    }

    fn from_link(link: &LinkRecord, failure: Option<FailureKind>, error: String) -> Self {
        Self {
            title: link.effective_title(),
            url: link.url().to_string(),
            time_added: link.time_added.timestamp(),
            tags: link.joined_tags(),
            status: link.status.clone(),
            success: failure.is_none(),
            error,
            failure,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.failure == Some(FailureKind::Timeout)
    }
}
