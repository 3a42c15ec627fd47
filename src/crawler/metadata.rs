//! HTML metadata extraction
//!
//! This module turns a fetched page into:
//! - A map of `<meta>` values keyed by `name` or `property`
//! - A resolved `title` entry
//! - The page markup handed to the content converter

use crate::links::META_TITLE;
use crate::url::is_absolute_url;
use scraper::{Html, Selector};
use std::collections::HashMap;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Meta values plus the resolved `title`
    pub meta: HashMap<String, String>,

    /// Inner markup of the root `<html>` element
    pub content: String,
}

/// Parses a page body and extracts its metadata and convertible markup
///
/// The document tree only lives for the duration of this call.
///
/// # Example
///
/// ```
/// use pocket_clipper::crawler::parse_page;
///
/// let html = r#"<html><head><title>Test</title></head><body><p>Hi</p></body></html>"#;
/// let parsed = parse_page(html, "Saved title");
/// assert_eq!(parsed.meta.get("title").map(String::as_str), Some("Test"));
/// assert!(parsed.content.contains("<p>Hi</p>"));
/// ```
pub fn parse_page(html: &str, fallback_title: &str) -> ParsedPage {
    let document = Html::parse_document(html);

    let meta = extract_metadata(&document, fallback_title);
    let content = document.root_element().inner_html();

    ParsedPage { meta, content }
}

/// Collects `<meta>` values and resolves the page title
///
/// # Title Resolution
///
/// 1. The first `<title>`, unless it is empty or just a URL
/// 2. The first non-empty `<h1>`
/// 3. `fallback_title`, the title saved with the bookmark
///
/// Later `<meta>` tags with the same key overwrite earlier ones. A
/// `<meta name="title">` is replaced by the resolved title.
pub fn extract_metadata(document: &Html, fallback_title: &str) -> HashMap<String, String> {
    let mut meta = extract_meta_tags(document);

    let title = extract_title(document)
        .filter(|t| !is_absolute_url(t))
        .or_else(|| extract_first_heading(document))
        .unwrap_or_else(|| fallback_title.to_string());

    meta.insert(META_TITLE.to_string(), title);
    meta
}

fn extract_meta_tags(document: &Html) -> HashMap<String, String> {
    let mut meta = HashMap::new();

    if let Ok(meta_selector) = Selector::parse("meta") {
        for element in document.select(&meta_selector) {
            let attrs = element.value();
            let key = match attrs.attr("name").or_else(|| attrs.attr("property")) {
                Some(key) if !key.is_empty() => key,
                _ => continue,
            };
            let content = attrs.attr("content").unwrap_or_default();
            meta.insert(key.to_string(), content.to_string());
        }
    }

    meta
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn extract_first_heading(document: &Html) -> Option<String> {
    let h1_selector = Selector::parse("h1").ok()?;

    document
        .select(&h1_selector)
        .map(|element| element.text().collect::<String>().trim().to_string())
        .find(|s| !s.is_empty())
}
