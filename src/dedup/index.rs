//! The persisted fingerprint index.

use crate::models::FingerprintEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candidate lookup strategy for near-duplicate comparison.
///
/// The detector only depends on the candidate contract, so the strategy
/// can trade exactness for scale without touching classification logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStrategy {
    /// Compare against every entry in the index.
    ///
    /// The reference behavior: exact, but quadratic in index size across a
    /// batch. Fine for the single-process scale this engine targets.
    #[default]
    FullScan,
    /// Compare only against entries whose canonical excerpt length is
    /// within `tolerance_pct` percent of the probe's length.
    ///
    /// A cheap prefilter: lexical similarity above any useful threshold is
    /// impossible between texts of very different lengths.
    LengthBanded {
        /// Allowed length deviation in percent of the probe length.
        tolerance_pct: u8,
    },
}

impl CandidateStrategy {
    /// Parses a strategy name as used in configuration.
    ///
    /// Accepts `full_scan` and `length_banded` (the latter with the default
    /// 40% tolerance).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "full_scan" => Some(Self::FullScan),
            "length_banded" => Some(Self::LengthBanded { tolerance_pct: 40 }),
            _ => None,
        }
    }
}

/// Hash-keyed store of canonical fingerprint entries.
///
/// Backed by a `BTreeMap` so iteration, candidate ordering, and snapshot
/// serialization are all deterministic.
///
/// # Invariant
///
/// Every key equals its entry's own `content_hash`; [`Self::upsert`] keys
/// entries by that field and is the only way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FingerprintIndex {
    entries: BTreeMap<String, FingerprintEntry>,
}

impl FingerprintIndex {
    /// Creates an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Looks up an entry by exact content hash.
    #[must_use]
    pub fn lookup_exact(&self, content_hash: &str) -> Option<&FingerprintEntry> {
        self.entries.get(content_hash)
    }

    /// Returns a mutable reference to an entry by content hash.
    #[must_use]
    pub fn entry_mut(&mut self, content_hash: &str) -> Option<&mut FingerprintEntry> {
        self.entries.get_mut(content_hash)
    }

    /// Returns the candidate entries for similarity comparison against
    /// `canonical`, in deterministic (hash) order.
    #[must_use]
    pub fn candidates(
        &self,
        canonical: &str,
        strategy: CandidateStrategy,
    ) -> Vec<&FingerprintEntry> {
        match strategy {
            CandidateStrategy::FullScan => self.entries.values().collect(),
            CandidateStrategy::LengthBanded { tolerance_pct } => {
                let probe_len = canonical.chars().count();
                let tolerance = probe_len * usize::from(tolerance_pct) / 100;
                self.entries
                    .values()
                    .filter(|entry| {
                        let len = entry.canonical_excerpt.chars().count();
                        len.abs_diff(probe_len) <= tolerance
                    })
                    .collect()
            },
        }
    }

    /// Inserts or replaces an entry, keyed by its own content hash.
    pub fn upsert(&mut self, entry: FingerprintEntry) {
        self.entries.insert(entry.content_hash.clone(), entry);
    }

    /// Removes an entry by content hash, returning it if present.
    pub fn remove(&mut self, content_hash: &str) -> Option<FingerprintEntry> {
        self.entries.remove(content_hash)
    }

    /// Number of entries in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in hash order.
    pub fn iter(&self) -> impl Iterator<Item = &FingerprintEntry> {
        self.entries.values()
    }

    /// Content hashes of all entries, in order.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a FingerprintIndex {
    type Item = &'a FingerprintEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, FingerprintEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str, excerpt: &str) -> FingerprintEntry {
        FingerprintEntry::new(hash, excerpt, "src-1", 100)
    }

    #[test]
    fn test_upsert_and_exact_lookup() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h1", "alpha"));

        assert_eq!(index.len(), 1);
        assert!(index.lookup_exact("h1").is_some());
        assert!(index.lookup_exact("h2").is_none());
    }

    #[test]
    fn test_upsert_replaces() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h1", "alpha"));
        index.upsert(entry("h1", "alpha revised"));

        assert_eq!(index.len(), 1);
        assert_eq!(
            index.lookup_exact("h1").unwrap().canonical_excerpt,
            "alpha revised"
        );
    }

    #[test]
    fn test_key_matches_entry_hash() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h1", "alpha"));
        index.upsert(entry("h2", "beta"));

        for (key, e) in index.hashes().zip(index.iter()) {
            assert_eq!(key, e.content_hash);
        }
    }

    #[test]
    fn test_remove() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h1", "alpha"));

        let removed = index.remove("h1").unwrap();
        assert_eq!(removed.content_hash, "h1");
        assert!(index.is_empty());
        assert!(index.remove("h1").is_none());
    }

    #[test]
    fn test_full_scan_returns_everything_ordered() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h2", "beta"));
        index.upsert(entry("h1", "alpha"));
        index.upsert(entry("h3", "gamma"));

        let candidates = index.candidates("anything", CandidateStrategy::FullScan);
        let hashes: Vec<_> = candidates.iter().map(|e| e.content_hash.as_str()).collect();
        assert_eq!(hashes, vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_length_banded_prefilter() {
        let mut index = FingerprintIndex::new();
        index.upsert(entry("h1", "short text here")); // 15 chars
        index.upsert(entry("h2", &"x".repeat(200)));

        let probe = "short text therein"; // 18 chars
        let candidates = index.candidates(
            probe,
            CandidateStrategy::LengthBanded { tolerance_pct: 40 },
        );
        let hashes: Vec<_> = candidates.iter().map(|e| e.content_hash.as_str()).collect();
        assert_eq!(hashes, vec!["h1"]);
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            CandidateStrategy::parse("full_scan"),
            Some(CandidateStrategy::FullScan)
        );
        assert_eq!(
            CandidateStrategy::parse("  LENGTH_BANDED "),
            Some(CandidateStrategy::LengthBanded { tolerance_pct: 40 })
        );
        assert_eq!(CandidateStrategy::parse("approximate"), None);
    }
}
