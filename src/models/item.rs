//! Incoming content item records.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A content item captured from the source repository.
///
/// Items are inputs only; they are never persisted. Their content is
/// fingerprinted into a [`super::FingerprintEntry`] during a sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Identifier of the item in the source system.
    pub source_id: String,
    /// Raw, un-normalized content text.
    pub raw_content: String,
    /// Path of the item within the source repository.
    pub source_path: String,
    /// Capture timestamp (Unix epoch seconds).
    pub captured_at: u64,
}

impl ContentItem {
    /// Creates a new content item.
    #[must_use]
    pub fn new(
        source_id: impl Into<String>,
        raw_content: impl Into<String>,
        source_path: impl Into<String>,
        captured_at: u64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            raw_content: raw_content.into(),
            source_path: source_path.into(),
            captured_at,
        }
    }

    /// Validates that the item carries the fields required for
    /// classification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] if `source_id` or `raw_content` is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        if self.source_id.trim().is_empty() {
            return Err(Error::InvalidItem("missing source_id".to_string()));
        }
        if self.raw_content.is_empty() {
            return Err(Error::InvalidItem(format!(
                "item '{}' has no raw_content",
                self.source_id
            )));
        }
        Ok(())
    }
}
