//! URL helpers for Pocket-Clipper
//!
//! Bookmarks are fetched as-is, so the only URL logic needed is deciding
//! whether a piece of text is itself a URL.

use url::Url;

/// Returns true if `value` parses as an absolute URL with both a scheme and a host
///
/// Used to reject page titles that are nothing but the page address.
///
/// # Examples
///
/// ```
/// use pocket_clipper::url::is_absolute_url;
///
/// assert!(is_absolute_url("https://example.com/post"));
/// assert!(!is_absolute_url("An Article Title"));
/// assert!(!is_absolute_url("/relative/path"));
/// ```
pub fn is_absolute_url(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    match Url::parse(value) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}
