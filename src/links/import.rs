//! Pocket CSV export reader
//!
//! The export has one row per bookmark with the header
//! `title,url,time_added,tags,status`; `time_added` is unix seconds and
//! `tags` is pipe-delimited.

use crate::links::LinkRecord;
use crate::ImportError;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One export row as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub title: String,
    pub url: String,
    pub time_added: i64,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub status: String,
}

impl RawLink {
    /// Converts the row into a [`LinkRecord`], splitting the tag list
    pub fn into_link(self) -> Result<LinkRecord, ImportError> {
        let time_added = Utc
            .timestamp_opt(self.time_added, 0)
            .single()
            .ok_or_else(|| ImportError::InvalidTimestamp {
                url: self.url.clone(),
                value: self.time_added,
            })?;

        let tags = if self.tags.is_empty() {
            Vec::new()
        } else {
            self.tags.split('|').map(str::to_string).collect()
        };

        Ok(LinkRecord::new(
            self.title,
            self.url,
            time_added,
            tags,
            self.status,
        ))
    }
}

/// Reads every bookmark from the export at `path`, preserving file order
///
/// Any unreadable or malformed row fails the whole import; nothing is
/// crawled from a partially understood export.
pub fn import_links(path: &Path) -> Result<Vec<LinkRecord>, ImportError> {
    tracing::debug!("Importing links from {}", path.display());

    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let links = parse_links(file, path)?;
    tracing::debug!("Found {} links", links.len());
    Ok(links)
}

/// Parses export rows from any reader; `source` only labels errors
pub fn parse_links<R: Read>(reader: R, source: &Path) -> Result<Vec<LinkRecord>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let mut links = Vec::new();
    for row in csv_reader.deserialize::<RawLink>() {
        let raw = row.map_err(|source_err| ImportError::Csv {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        links.push(raw.into_link()?);
    }

    Ok(links)
}
