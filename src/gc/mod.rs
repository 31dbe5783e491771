//! Archival sweep of stale index entries.
//!
//! Entries that have not been seen within the staleness cutoff *and* were
//! never reinforced by a merge are removed. Any entry ever merged into is
//! retained indefinitely: repeated duplication is itself a relevance
//! signal.
//!
//! The sweep is the only operation that removes entries from the index;
//! duplicate handling never deletes as a side effect.

use crate::dedup::FingerprintIndex;
use crate::models::FingerprintEntry;
use tracing::{debug, info, instrument};

/// Seconds in one day.
const SECONDS_PER_DAY: u64 = 86_400;

/// Result of an archival sweep.
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    /// Entries examined.
    pub entries_checked: usize,
    /// Entries removed from the index, in hash order.
    ///
    /// Returned owned so the caller can clean up anything keyed off the
    /// removed entries (e.g. external target mappings).
    pub removed: Vec<FingerprintEntry>,
}

impl SweepResult {
    /// Number of entries removed.
    #[must_use]
    pub const fn removed_count(&self) -> usize {
        self.removed.len()
    }

    /// Returns a human-readable summary of the sweep.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.removed.is_empty() {
            format!("No stale entries found ({} checked)", self.entries_checked)
        } else {
            format!(
                "Archived {} stale entries ({} checked)",
                self.removed.len(),
                self.entries_checked
            )
        }
    }
}

/// Removes stale, unreinforced entries from the index.
///
/// An entry is swept when `last_seen_at` is more than `max_age_days` old
/// relative to `now` **and** its `merge_count` is zero.
///
/// # Arguments
///
/// * `index` - The fingerprint index to sweep
/// * `now` - Current Unix timestamp in seconds
/// * `max_age_days` - Staleness cutoff in days
#[instrument(skip(index), fields(operation = "archival_sweep", index_len = index.len()))]
pub fn sweep_stale(index: &mut FingerprintIndex, now: u64, max_age_days: u64) -> SweepResult {
    let max_age_secs = max_age_days.saturating_mul(SECONDS_PER_DAY);
    let entries_checked = index.len();

    let stale_hashes: Vec<String> = index
        .iter()
        .filter(|entry| entry.is_stale(now, max_age_secs) && !entry.is_reinforced())
        .map(|entry| entry.content_hash.clone())
        .collect();

    let mut removed = Vec::with_capacity(stale_hashes.len());
    for hash in stale_hashes {
        if let Some(entry) = index.remove(&hash) {
            debug!(
                hash = %entry.content_hash,
                last_seen_at = entry.last_seen_at,
                age_days = now.saturating_sub(entry.last_seen_at) / SECONDS_PER_DAY,
                "Archived stale entry"
            );
            removed.push(entry);
        }
    }

    let result = SweepResult {
        entries_checked,
        removed,
    };

    metrics::counter!("knowsync_sweep_runs_total").increment(1);
    metrics::counter!("knowsync_entries_archived_total").increment(result.removed_count() as u64);

    info!(
        entries_checked = result.entries_checked,
        entries_removed = result.removed_count(),
        max_age_days,
        "Archival sweep completed"
    );

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = SECONDS_PER_DAY;

    fn entry_seen_at(hash: &str, last_seen: u64, merge_count: u64) -> FingerprintEntry {
        let mut entry = FingerprintEntry::new(hash, "text", "src-1", last_seen);
        entry.merge_count = merge_count;
        entry
    }

    #[test]
    fn test_stale_unreinforced_entry_removed() {
        let now = 100 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-stale", now - 31 * DAY, 0));

        let result = sweep_stale(&mut index, now, 30);
        assert_eq!(result.entries_checked, 1);
        assert_eq!(result.removed_count(), 1);
        assert!(index.is_empty());
    }

    #[test]
    fn test_reinforced_entry_retained_regardless_of_age() {
        let now = 1000 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-old-but-merged", now - 900 * DAY, 1));

        let result = sweep_stale(&mut index, now, 30);
        assert_eq!(result.removed_count(), 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_fresh_entry_retained() {
        let now = 100 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-fresh", now - 29 * DAY, 0));

        let result = sweep_stale(&mut index, now, 30);
        assert_eq!(result.removed_count(), 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_exact_cutoff_not_removed() {
        // Exactly max_age old is not "older than" the cutoff
        let now = 100 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-boundary", now - 30 * DAY, 0));

        let result = sweep_stale(&mut index, now, 30);
        assert_eq!(result.removed_count(), 0);
    }

    #[test]
    fn test_mixed_sweep() {
        let now = 100 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-stale", now - 31 * DAY, 0));
        index.upsert(entry_seen_at("h-merged", now - 31 * DAY, 1));
        index.upsert(entry_seen_at("h-fresh", now - DAY, 0));

        let result = sweep_stale(&mut index, now, 30);
        assert_eq!(result.entries_checked, 3);
        assert_eq!(result.removed_count(), 1);
        assert_eq!(result.removed[0].content_hash, "h-stale");
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_index() {
        let mut index = FingerprintIndex::new();
        let result = sweep_stale(&mut index, 100 * DAY, 30);
        assert_eq!(result.entries_checked, 0);
        assert_eq!(result.removed_count(), 0);
        assert!(result.summary().contains("No stale entries"));
    }

    #[test]
    fn test_summary_wording() {
        let now = 100 * DAY;
        let mut index = FingerprintIndex::new();
        index.upsert(entry_seen_at("h-stale", now - 40 * DAY, 0));

        let result = sweep_stale(&mut index, now, 30);
        assert!(result.summary().contains("Archived 1 stale"));
    }
}
