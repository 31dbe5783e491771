//! Persisted fingerprint entries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A canonical entry in the fingerprint index.
///
/// One entry represents a cluster of duplicate or near-duplicate content.
/// The entry created first stays canonical; later arrivals only add
/// provenance (`source_refs`, `merge_count`) and refresh `last_seen_at`.
///
/// # Invariants
///
/// - `source_refs` is never empty once the entry exists
/// - `last_seen_at >= first_seen_at`
/// - the index key for this entry equals `content_hash`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintEntry {
    /// SHA-256 hash (lowercase hex) of the normalized content.
    pub content_hash: String,
    /// The normalized content at insertion time. Never rewritten by
    /// near-duplicate merges.
    pub canonical_excerpt: String,
    /// Identifier assigned by the knowledge store after the first push,
    /// `None` until then.
    pub target_id: Option<String>,
    /// When this content was first observed (Unix epoch seconds).
    pub first_seen_at: u64,
    /// When this content was last observed (Unix epoch seconds).
    pub last_seen_at: u64,
    /// How many near-duplicates have been merged into this entry.
    pub merge_count: u64,
    /// Source-system ids that observed this content. Never empty.
    pub source_refs: BTreeSet<String>,
}

impl FingerprintEntry {
    /// Creates a new entry for freshly observed content.
    #[must_use]
    pub fn new(
        content_hash: impl Into<String>,
        canonical_excerpt: impl Into<String>,
        source_id: impl Into<String>,
        seen_at: u64,
    ) -> Self {
        let mut source_refs = BTreeSet::new();
        source_refs.insert(source_id.into());
        Self {
            content_hash: content_hash.into(),
            canonical_excerpt: canonical_excerpt.into(),
            target_id: None,
            first_seen_at: seen_at,
            last_seen_at: seen_at,
            merge_count: 0,
            source_refs,
        }
    }

    /// Records a re-observation of this content.
    ///
    /// Refreshes `last_seen_at` (timestamps never move backwards) and adds
    /// the source ref. Returns `true` if the source id was not previously a
    /// ref, i.e. the entry gained new provenance.
    pub fn observe(&mut self, source_id: impl Into<String>, seen_at: u64) -> bool {
        self.last_seen_at = self.last_seen_at.max(seen_at);
        self.source_refs.insert(source_id.into())
    }

    /// Returns `true` if the entry has not been seen within `max_age_secs`
    /// of `now`.
    #[must_use]
    pub const fn is_stale(&self, now: u64, max_age_secs: u64) -> bool {
        now.saturating_sub(self.last_seen_at) > max_age_secs
    }

    /// Returns `true` if at least one near-duplicate was ever merged into
    /// this entry.
    ///
    /// Reinforced entries are retained by the archival sweep regardless of
    /// age: repeated duplication is itself a relevance signal.
    #[must_use]
    pub const fn is_reinforced(&self) -> bool {
        self.merge_count > 0
    }
}
