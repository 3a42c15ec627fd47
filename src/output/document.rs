//! Markdown clipping writer
//!
//! Each clipping is a front-matter block followed by the converted page:
//!
//! ```text
//! ---
//! title: "..."
//! source: "..."
//! author:
//!   - "..."
//! published: YYYY-MM-DD
//! created: YYYY-MM-DD
//! description: "..."
//! tags:
//!   - "clippings"
//!   - "pocket"
//! ---
//! ```
//!
//! File names come from the effective title. Two links resolving to the same
//! name write to the same file and the last rename wins. Each clipping is
//! staged in a hidden temporary file beside its target and renamed into
//! place, so a reader never sees two bodies mixed or a half-written file.

use crate::links::{LinkRecord, NO_DESCRIPTION};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tokio::fs;

/// Distinguishes staging files of concurrent writes in one process
static STAGING_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Folder under the base directory receiving every clipping
pub const CLIPPINGS_DIR: &str = "clippings";

const MAX_STEM_BYTES: usize = 200;

/// Filesystem failure while writing a clipping
#[derive(Debug, Error)]
#[error("Failed to write {}: {source}", path.display())]
pub struct WriteError {
    pub path: PathBuf,
    pub source: std::io::Error,
}

/// Writes clippings into `<base_dir>/clippings`
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    clippings_dir: PathBuf,
    fixed_tags: Vec<String>,
}

impl DocumentWriter {
    pub fn new(base_dir: impl AsRef<Path>, fixed_tags: Vec<String>) -> Self {
        Self {
            clippings_dir: base_dir.as_ref().join(CLIPPINGS_DIR),
            fixed_tags,
        }
    }

    pub fn clippings_dir(&self) -> &Path {
        &self.clippings_dir
    }

    /// Path the clipping for `link` will be written to
    pub fn path_for(&self, link: &LinkRecord) -> PathBuf {
        let file_name = format!("{}.md", sanitize_file_name(&link.effective_title()));
        self.clippings_dir.join(file_name)
    }

    /// Writes the clipping and returns its path
    ///
    /// The file is replaced atomically: an existing clipping with the same
    /// name is either kept whole or fully replaced.
    pub async fn write(&self, link: &LinkRecord, content: &str) -> Result<PathBuf, WriteError> {
        fs::create_dir_all(&self.clippings_dir)
            .await
            .map_err(|source| WriteError {
                path: self.clippings_dir.clone(),
                source,
            })?;

        let path = self.path_for(link);
        let staging = self.staging_path_for(&path);

        let mut document = render_front_matter(link, &self.fixed_tags);
        document.push_str(content);

        if let Err(source) = fs::write(&staging, document.as_bytes()).await {
            discard_staging(&staging).await;
            return Err(WriteError { path, source });
        }

        if let Err(source) = fs::rename(&staging, &path).await {
            discard_staging(&staging).await;
            return Err(WriteError { path, source });
        }

        Ok(path)
    }

    fn staging_path_for(&self, target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let n = STAGING_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.clippings_dir
            .join(format!(".{}.{}-{}.tmp", name, std::process::id(), n))
    }
}

async fn discard_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!("Could not remove {}: {}", staging.display(), e);
        }
    }
}

/// Renders the front-matter block, closing delimiter and blank line included
pub fn render_front_matter(link: &LinkRecord, fixed_tags: &[String]) -> String {
    let mut header = String::from("---\n");

    // Writing into a String cannot fail.
    let _ = writeln!(header, "title: {}", quote(&link.effective_title()));
    let _ = writeln!(header, "source: {}", quote(link.url()));
    let _ = writeln!(header, "author:\n  - {}", quote(link.author()));
    if let Some(published) = link.published_time() {
        let _ = writeln!(header, "published: {}", published.format("%Y-%m-%d"));
    }
    let _ = writeln!(header, "created: {}", link.time_added.format("%Y-%m-%d"));
    let description = link.description();
    if description != NO_DESCRIPTION {
        let _ = writeln!(header, "description: {}", quote(description));
    }
    header.push_str("tags:\n");
    for tag in fixed_tags.iter().chain(link.tags.iter()) {
        let _ = writeln!(header, "  - {}", quote(tag));
    }
    header.push_str("---\n\n");

    header
}

fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' | '\r' => quoted.push(' '),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Turns a title into a safe file stem
///
/// Letters, digits, spaces, `-`, `_` and `.` are kept; everything else becomes
/// `_`. Runs of `_` collapse, separators are trimmed from both ends and the
/// result is capped at 200 bytes. An empty result becomes `untitled`.
pub fn sanitize_file_name(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if c.is_alphanumeric() || matches!(c, ' ' | '-' | '.') {
            c
        } else {
            '_'
        };
        if c == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(c);
    }

    if stem.len() > MAX_STEM_BYTES {
        let mut end = MAX_STEM_BYTES;
        while !stem.is_char_boundary(end) {
            end -= 1;
        }
        stem.truncate(end);
    }

    let stem = stem.trim_matches(|c: char| matches!(c, ' ' | '.' | '_'));
    if stem.is_empty() {
        "untitled".to_string()
    } else {
        stem.to_string()
    }
}
