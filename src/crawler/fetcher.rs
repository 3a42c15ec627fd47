//! HTTP fetcher implementation
//!
//! This module handles the single GET issued per bookmark:
//! - Building the shared HTTP client with a browser user agent and deadline
//! - Racing each request against the batch cancellation token
//! - Tagging every failure as a timeout or another error where it happens

use crate::config::CrawlerConfig;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A successfully loaded page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Coarse classification of a fetch failure
///
/// Timeouts are expected in a large batch and logged at warn; everything else
/// is logged at error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Timeout,
    Other,
}

/// Fetch failures, one variant per place a request can go wrong
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Request cancelled for {url}")]
    Cancelled { url: String },

    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    #[error("Unsupported content type '{content_type}' for {url}")]
    ContentType { url: String, content_type: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    /// Classification fixed by the variant; cancellation counts as a timeout
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Timeout { .. } | Self::Cancelled { .. } => FetchErrorKind::Timeout,
            Self::Status { .. } | Self::ContentType { .. } | Self::Network { .. } => {
                FetchErrorKind::Other
            }
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == FetchErrorKind::Timeout
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The request deadline covers the whole exchange, body included.
///
/// # Example
///
/// ```no_run
/// use pocket_clipper::config::CrawlerConfig;
/// use pocket_clipper::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(config.request_timeout_secs);

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page, giving up early if `cancel` fires
///
/// # Returns
///
/// * `Ok(FetchedPage)` - 2xx `text/html` response with its body
/// * `Err(FetchError)` - timeout, cancellation, non-2xx status, non-HTML body
///   or transport error
pub async fn fetch_page(
    client: &Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<FetchedPage, FetchError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(FetchError::Cancelled {
            url: url.to_string(),
        }),
        result = request_page(client, url) => result,
    }
}

async fn request_page(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status_code: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return Err(FetchError::ContentType {
            url: url.to_string(),
            content_type,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchedPage {
        final_url,
        status_code: status.as_u16(),
        body,
    })
}
