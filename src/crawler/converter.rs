//! Markup to Markdown conversion
//!
//! The crawler only knows the [`ContentConverter`] capability, so tests can
//! swap in converters that succeed or fail on demand.

use thiserror::Error;

/// Conversion failure, carrying the converter's own message
#[derive(Debug, Clone, Error)]
#[error("Conversion failed: {message}")]
pub struct ConversionError {
    pub message: String,
}

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Converts a block of page markup into document content
pub trait ContentConverter: Send + Sync {
    fn convert(&self, html: &str) -> Result<String, ConversionError>;
}

/// HTML to Markdown converter backed by `htmd`
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }
}

impl ContentConverter for MarkdownConverter {
    fn convert(&self, html: &str) -> Result<String, ConversionError> {
        htmd::convert(html).map_err(|e| ConversionError::new(e.to_string()))
    }
}
