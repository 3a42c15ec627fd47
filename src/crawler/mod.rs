//! Crawler module for fetching bookmarked pages and clipping them
//!
//! This module contains the batch pipeline, including:
//! - HTTP fetching with timeout and cancellation classification
//! - HTML metadata extraction
//! - Markup to Markdown conversion
//! - Per-link orchestration and outcome collection

mod converter;
mod coordinator;
mod fetcher;
mod metadata;

pub use converter::{ContentConverter, ConversionError, MarkdownConverter};
pub use coordinator::Crawler;
pub use fetcher::{build_http_client, fetch_page, FetchError, FetchErrorKind, FetchedPage};
pub use metadata::{extract_metadata, parse_page, ParsedPage};

use crate::config::Config;
use crate::links::LinkRecord;
use crate::output::CrawlOutcome;
use tokio_util::sync::CancellationToken;

/// Runs a complete batch
///
/// This is the main entry point for clipping a list of links. It will:
/// 1. Build the HTTP client and Markdown converter
/// 2. Visit every link concurrently
/// 3. Write one clipping per successfully converted page
/// 4. Return one outcome per link
///
/// # Returns
///
/// * `Ok(Vec<CrawlOutcome>)` - Every link's outcome, in completion order
/// * `Err(ClipperError)` - The client could not be built or the batch was cancelled
pub async fn crawl(
    config: &Config,
    links: Vec<LinkRecord>,
    cancel: &CancellationToken,
) -> crate::Result<Vec<CrawlOutcome>> {
    Crawler::new(config)?.run(links, cancel).await
}
