//! Pocket-Clipper: turns a bookmark export into Markdown clippings
//!
//! This crate visits every link of a Pocket CSV export concurrently, extracts
//! page metadata, converts the page to Markdown and writes one file per link,
//! then reports which links failed and why.

pub mod config;
pub mod crawler;
pub mod links;
pub mod output;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Batch-level error type for Pocket-Clipper operations
///
/// Per-link failures never surface here; they are recorded in the link's
/// [`output::CrawlOutcome`] instead.
#[derive(Debug, Error)]
pub enum ClipperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Batch cancelled with {completed} of {total} links clipped")]
    Cancelled { completed: usize, total: usize },

    #[error("Report error for {}: {source}", path.display())]
    Report { path: PathBuf, source: csv::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while reading the bookmark export
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open export {}: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed row in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("Invalid time_added {value} for {url}")]
    InvalidTimestamp { url: String, value: i64 },
}

/// Result type alias for Pocket-Clipper operations
pub type Result<T> = std::result::Result<T, ClipperError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Crawler, FetchError, FetchErrorKind};
pub use links::{import_links, LinkRecord};
pub use output::{CrawlOutcome, FailureKind, RunSummary};
pub use state::LinkState;
