//! Bookmark records and their derived metadata
//!
//! A [`LinkRecord`] is one row of the export. Its `meta` map starts empty and is
//! filled by the metadata extractor once the page has been fetched; the
//! accessors below resolve the values written into each clipping.

mod import;

pub use import::{import_links, parse_links, RawLink};

use chrono::{DateTime, FixedOffset, Utc};
use std::collections::HashMap;

/// Meta keys consulted by the accessors
pub const META_OG_TITLE: &str = "og:title";
pub const META_TITLE: &str = "title";
pub const META_AUTHOR: &str = "article:author";
pub const META_DESCRIPTION: &str = "description";
pub const META_OG_DESCRIPTION: &str = "og:description";
pub const META_PUBLISHED_TIME: &str = "article:published_time";

/// Author written when the page names none
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Description sentinel for pages without one
pub const NO_DESCRIPTION: &str = "none";

/// One bookmarked item
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    /// Title as saved in the export
    pub title: String,
    url: String,
    /// When the bookmark was saved
    pub time_added: DateTime<Utc>,
    /// Tags in export order
    pub tags: Vec<String>,
    /// Pocket read status (`unread`, `archive`, ...)
    pub status: String,
    meta: HashMap<String, String>,
}

impl LinkRecord {
    /// Creates a record with an empty meta map
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        time_added: DateTime<Utc>,
        tags: Vec<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            time_added,
            tags,
            status: status.into(),
            meta: HashMap::new(),
        }
    }

    /// The bookmarked URL; fixed for the lifetime of the record
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Metadata extracted from the fetched page
    pub fn meta(&self) -> &HashMap<String, String> {
        &self.meta
    }

    /// Merges extracted metadata into the record
    ///
    /// Existing keys are overwritten; nothing is ever removed.
    pub fn apply_meta(&mut self, meta: HashMap<String, String>) {
        self.meta.extend(meta);
    }

    fn meta_value(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Title used for the clipping and its file name, HTML-escaped
    ///
    /// Resolution order: `og:title`, extracted `title`, then the export title.
    pub fn effective_title(&self) -> String {
        let title = self
            .meta_value(META_OG_TITLE)
            .or_else(|| self.meta_value(META_TITLE))
            .unwrap_or(self.title.as_str());
        escape_html(title)
    }

    pub fn author(&self) -> &str {
        self.meta_value(META_AUTHOR).unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Page description, or [`NO_DESCRIPTION`]
    pub fn description(&self) -> &str {
        self.meta_value(META_DESCRIPTION)
            .or_else(|| self.meta_value(META_OG_DESCRIPTION))
            .unwrap_or(NO_DESCRIPTION)
    }

    /// Publication time from `article:published_time`, if it is valid RFC 3339
    pub fn published_time(&self) -> Option<DateTime<FixedOffset>> {
        self.meta_value(META_PUBLISHED_TIME)
            .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
    }

    /// Tags joined the way the export stores them
    pub fn joined_tags(&self) -> String {
        self.tags.join("|")
    }
}

/// Escapes the five characters significant in HTML text and attributes
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
