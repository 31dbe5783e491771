//! Near-duplicate merge strategy.

use crate::models::{ContentItem, FingerprintEntry};

/// Folds a near-duplicate item into its canonical entry.
///
/// The existing entry stays canonical: its `target_id` and
/// `canonical_excerpt` are preserved. Only provenance is tracked: the
/// incoming source id joins `source_refs` and `merge_count` is bumped,
/// with `last_seen_at` taking the later timestamp. Text is never spliced.
///
/// # Example
///
/// ```rust
/// use knowsync::{ContentItem, FingerprintEntry};
/// use knowsync::dedup::merge_into;
///
/// let mut entry = FingerprintEntry::new("h1", "canonical text", "src-1", 100);
/// let item = ContentItem::new("src-2", "canonical text, slightly reworded", "notes/b.md", 200);
/// merge_into(&mut entry, &item, 0.87);
///
/// assert_eq!(entry.merge_count, 1);
/// assert_eq!(entry.canonical_excerpt, "canonical text");
/// assert!(entry.source_refs.contains("src-2"));
/// ```
pub fn merge_into(entry: &mut FingerprintEntry, item: &ContentItem, score: f32) {
    entry.observe(item.source_id.clone(), item.captured_at);
    entry.merge_count += 1;

    tracing::debug!(
        canonical = %entry.content_hash,
        source_id = %item.source_id,
        score,
        merge_count = entry.merge_count,
        "Merged near-duplicate into canonical entry"
    );
}
