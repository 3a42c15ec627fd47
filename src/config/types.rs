use serde::Deserialize;

/// User agent sent with every page request
///
/// A desktop browser string keeps trivial bot filters from rejecting the
/// request outright.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Main configuration structure for Pocket-Clipper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Per-request deadline in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of links processed at once (0 = one task per link, unbounded)
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// User agent header value
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            max_concurrent_fetches: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the `clippings` folder and the failure report
    #[serde(rename = "base-dir")]
    pub base_dir: String,

    /// File name of the failure report, relative to `base-dir`
    #[serde(rename = "report-file")]
    pub report_file: String,

    /// Tags written into every clipping before the bookmark's own tags
    #[serde(rename = "fixed-tags")]
    pub fixed_tags: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: "./exported".to_string(),
            report_file: "failed.csv".to_string(),
            fixed_tags: vec!["clippings".to_string(), "pocket".to_string()],
        }
    }
}
