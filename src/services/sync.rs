//! The batch sync orchestrator.
//!
//! Drives one pass: classify each item, apply the outcome to the state,
//! run the archival sweep, and derive a report. `run_sync` is pure with
//! respect to its explicit state argument, so passes are testable in
//! isolation and safe to re-run: already-processed items simply
//! reclassify as exact duplicates.

use crate::config::SyncConfig;
use crate::dedup::{
    Classification, ContentHasher, DuplicateDetector, LexicalScorer, SimilarityScorer, merge_into,
    normalize,
};
use crate::gc::sweep_stale;
use crate::models::{ContentItem, FingerprintEntry, SyncReport, SyncState};
use crate::storage::StateStore;
use crate::{Result, current_timestamp};
use chrono::Utc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Orchestrates batch sync passes.
///
/// # Concurrency
///
/// Single-writer, single-pass: one sync pass is strictly sequential over
/// its batch, and concurrent runs against the same persisted state must be
/// prevented by the caller (advisory lock or a single scheduler).
///
/// # Example
///
/// ```rust
/// use knowsync::{ContentItem, SyncConfig, SyncService, SyncState, current_timestamp};
///
/// let now = current_timestamp();
/// let service = SyncService::new(SyncConfig::default());
/// let items = vec![
///     ContentItem::new("a", "meeting notes about caching", "notes/1.md", now),
///     ContentItem::new("b", "meeting notes about caching", "notes/2.md", now),
/// ];
/// let (state, report) = service.run_sync(&items, SyncState::new());
/// assert_eq!(state.counters.exact_duplicates, 1);
/// assert!((report.dedup_ratio - 0.5).abs() < f32::EPSILON);
/// ```
pub struct SyncService {
    /// Pass configuration.
    config: SyncConfig,
    /// Similarity scorer for the near-duplicate tier.
    scorer: Box<dyn SimilarityScorer>,
}

impl SyncService {
    /// Creates a service with the default lexical scorer.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            scorer: Box::new(LexicalScorer),
        }
    }

    /// Replaces the similarity scorer.
    ///
    /// The detector depends only on the [`SimilarityScorer`] contract, so
    /// e.g. an embedding-based cosine scorer slots in without further
    /// changes.
    #[must_use]
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Runs one sync pass over `items`, returning the updated state and a
    /// report for the run.
    ///
    /// Items are processed in arrival order. A failure on a single item is
    /// logged, counted under `errors`, and skipped; it never aborts the
    /// run and never leaves a partially-written entry. After all items the
    /// archival sweep runs and `last_sync_at` is stamped.
    ///
    /// Persistence is separate (see [`Self::run_and_persist`]); this
    /// method touches nothing but its arguments.
    #[instrument(skip(self, items, state), fields(operation = "run_sync", batch = items.len()))]
    #[must_use]
    pub fn run_sync(&self, items: &[ContentItem], mut state: SyncState) -> (SyncState, SyncReport) {
        let run_timestamp = Utc::now();
        let start = Instant::now();
        let before = state.counters.clone();

        for item in items {
            if let Err(e) = self.apply_item(item, &mut state) {
                warn!(source_id = %item.source_id, error = %e, "Item failed, skipping");
                state.counters.errors += 1;
                metrics::counter!("knowsync_items_total", "outcome" => "error").increment(1);
            }
        }

        let sweep = sweep_stale(
            &mut state.index,
            current_timestamp(),
            self.config.max_age_days,
        );
        // Entries gone from the index must not keep their target mappings
        for removed in &sweep.removed {
            if let Some(target_id) = &removed.target_id {
                state.external_mappings.retain(|_, v| v != target_id);
            }
        }
        state.counters.archived += sweep.removed_count() as u64;
        state.last_sync_at = Some(run_timestamp);

        let delta = state.counters.delta_since(&before);
        let report = SyncReport::from_run(
            run_timestamp,
            items.len() as u64,
            delta,
            &state,
            self.config.report_sample_size,
        );

        metrics::histogram!("knowsync_run_duration_ms")
            .record(start.elapsed().as_secs_f64() * 1000.0);
        info!(
            items = items.len(),
            new = report.delta.new_inserted,
            exact = report.delta.exact_duplicates,
            merged = report.delta.near_duplicates_merged,
            archived = report.delta.archived,
            errors = report.delta.errors,
            "Sync pass completed"
        );

        (state, report)
    }

    /// Loads state from `store` (or starts empty), runs one pass, and
    /// saves the result as an atomic snapshot.
    ///
    /// Aborting before the save has no effect on persisted state.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::VersionMismatch`] if the snapshot was written by
    ///   a newer engine; the file is left untouched
    /// - [`crate::Error::Persistence`] if loading or the atomic save
    ///   fails; the previous snapshot remains valid
    #[instrument(skip(self, items, store), fields(operation = "run_and_persist"))]
    pub fn run_and_persist(&self, items: &[ContentItem], store: &StateStore) -> Result<SyncReport> {
        let state = store.load()?.unwrap_or_else(SyncState::new);
        let (state, report) = self.run_sync(items, state);
        store.save(&state)?;
        Ok(report)
    }

    /// Classifies one item and applies the outcome to the state.
    ///
    /// Classification never mutates the index; all mutation happens here,
    /// after the classification is decided.
    fn apply_item(&self, item: &ContentItem, state: &mut SyncState) -> Result<()> {
        item.validate()?;

        let canonical = normalize(&item.raw_content);
        let hash = ContentHasher::hash(&canonical);

        let classification = {
            let detector = DuplicateDetector::new(
                &state.index,
                self.scorer.as_ref(),
                self.config.similarity_threshold,
                self.config.candidate_strategy,
            );
            detector.classify(&canonical, &hash)
        };

        metrics::counter!("knowsync_items_total", "outcome" => classification.as_str())
            .increment(1);

        match classification {
            Classification::New => {
                state.index.upsert(FingerprintEntry::new(
                    hash,
                    canonical,
                    item.source_id.clone(),
                    item.captured_at,
                ));
                state.counters.new_inserted += 1;
            },
            Classification::ExactDuplicate { hash } => {
                if let Some(entry) = state.index.entry_mut(&hash) {
                    let gained_ref = entry.observe(item.source_id.clone(), item.captured_at);
                    state.counters.exact_duplicates += 1;
                    if gained_ref {
                        state.counters.updated += 1;
                    }
                }
                state.link_source(&item.source_id, &hash);
            },
            Classification::NearDuplicate { hash, score } => {
                if let Some(entry) = state.index.entry_mut(&hash) {
                    merge_into(entry, item, score);
                    state.counters.near_duplicates_merged += 1;
                }
                state.link_source(&item.source_id, &hash);
            },
        }

        state.counters.total_processed += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::dedup::CandidateStrategy;

    fn service() -> SyncService {
        SyncService::new(SyncConfig::default())
    }

    // Capture timestamps must be recent or the in-pass archival sweep
    // removes the freshly inserted entries.
    fn item(id: &str, content: &str, at: u64) -> ContentItem {
        ContentItem::new(id, content, format!("src/{id}.md"), at)
    }

    #[test]
    fn test_new_items_inserted() {
        let now = current_timestamp();
        let items = vec![
            item("a", "first unique note", now - 100),
            item("b", "second unrelated subject", now),
        ];
        let (state, report) = service().run_sync(&items, SyncState::new());

        assert_eq!(state.index.len(), 2);
        assert_eq!(state.counters.new_inserted, 2);
        assert_eq!(state.counters.total_processed, 2);
        assert!(report.dedup_ratio.abs() < f32::EPSILON);
        assert!(state.last_sync_at.is_some());
    }

    #[test]
    fn test_exact_duplicate_within_one_run() {
        let now = current_timestamp();
        let items = vec![
            item("a", "identical content", now - 100),
            item("b", "identical content", now),
        ];
        let (state, _) = service().run_sync(&items, SyncState::new());

        assert_eq!(state.index.len(), 1);
        assert_eq!(state.counters.new_inserted, 1);
        assert_eq!(state.counters.exact_duplicates, 1);
        assert_eq!(state.counters.updated, 1);

        let entry = state.index.iter().next().unwrap();
        assert!(entry.source_refs.contains("a"));
        assert!(entry.source_refs.contains("b"));
        assert_eq!(entry.last_seen_at, now);
    }

    #[test]
    fn test_re_observation_is_not_an_update() {
        let now = current_timestamp();
        let items = vec![
            item("a", "same thing", now - 100),
            item("a", "same thing", now),
        ];
        let (state, _) = service().run_sync(&items, SyncState::new());

        assert_eq!(state.counters.exact_duplicates, 1);
        assert_eq!(state.counters.updated, 0);
    }

    #[test]
    fn test_near_duplicate_merged() {
        let now = current_timestamp();
        let items = vec![
            item(
                "a",
                "the quick brown fox jumps over the lazy dog near the river",
                now - 100,
            ),
            item(
                "b",
                "the quick brown fox jumps over the lazy dog near the creek",
                now,
            ),
        ];
        let (state, _) = service().run_sync(&items, SyncState::new());

        assert_eq!(state.index.len(), 1);
        assert_eq!(state.counters.near_duplicates_merged, 1);

        let entry = state.index.iter().next().unwrap();
        assert_eq!(entry.merge_count, 1);
        assert!(entry.source_refs.contains("a"));
        assert!(entry.source_refs.contains("b"));
        // First processed stays canonical
        assert!(entry.canonical_excerpt.contains("river"));
    }

    #[test]
    fn test_invalid_item_counted_and_skipped() {
        let now = current_timestamp();
        let items = vec![
            item("a", "good content", now),
            item("b", "", now),
            item("c", "more good content on another topic entirely", now),
        ];
        let (state, report) = service().run_sync(&items, SyncState::new());

        assert_eq!(state.counters.total_processed, 2);
        assert_eq!(state.counters.errors, 1);
        assert_eq!(report.items_considered, 3);
        assert_eq!(state.index.len(), 2);
    }

    #[test]
    fn test_double_run_is_all_exact_duplicates() {
        let now = current_timestamp();
        let items = vec![
            item("a", "alpha content", now - 100),
            item("b", "beta content entirely different", now),
        ];
        let svc = service();
        let (state, _) = svc.run_sync(&items, SyncState::new());
        let hashes_before: Vec<String> = state.index.hashes().map(String::from).collect();

        let (state, report) = svc.run_sync(&items, state);
        assert!((report.dedup_ratio - 1.0).abs() < f32::EPSILON);
        assert_eq!(report.delta.exact_duplicates, 2);
        assert_eq!(report.delta.new_inserted, 0);

        // Index content unchanged beyond bookkeeping
        let hashes_after: Vec<String> = state.index.hashes().map(String::from).collect();
        assert_eq!(hashes_before, hashes_after);
    }

    #[test]
    fn test_sweep_prunes_external_mappings() {
        let mut state = SyncState::new();
        // Deliberately ancient, so the sweep takes it
        state
            .index
            .upsert(FingerprintEntry::new("h-stale", "old text", "src-old", 100));
        state.assign_target("h-stale", "kb-1").unwrap();
        assert!(!state.external_mappings.is_empty());

        // No items: the pass is just sweep + report
        let (state, report) = service().run_sync(&[], state);

        assert!(state.index.is_empty());
        assert_eq!(state.counters.archived, 1);
        assert!(state.external_mappings.is_empty());
        assert_eq!(report.delta.archived, 1);
    }

    #[test]
    fn test_exact_hit_links_to_synced_target() {
        let now = current_timestamp();
        let items = vec![item("a", "stable content", now - 100)];
        let svc = service();
        let (mut state, _) = svc.run_sync(&items, SyncState::new());

        let hash: String = state.index.hashes().next().unwrap().to_string();
        state.assign_target(&hash, "kb-7").unwrap();

        let again = vec![item("z", "stable content", now)];
        let (state, _) = svc.run_sync(&again, state);
        assert_eq!(state.external_mappings.get("z").unwrap(), "kb-7");
    }

    #[test]
    fn test_scorer_failure_counts_as_new_not_error() {
        struct BrokenScorer;
        impl SimilarityScorer for BrokenScorer {
            fn score(&self, _a: &str, _b: &str) -> Result<f32> {
                Err(Error::Scorer("offline".to_string()))
            }
        }

        let now = current_timestamp();
        let svc = SyncService::new(SyncConfig::default()).with_scorer(Box::new(BrokenScorer));
        let items = vec![
            item("a", "some content about databases", now - 100),
            item("b", "some content about databases!", now),
        ];
        let (state, _) = svc.run_sync(&items, SyncState::new());

        // Degraded comparisons mean the second item lands as new
        assert_eq!(state.counters.errors, 0);
        assert_eq!(state.counters.new_inserted, 2);
        assert_eq!(state.index.len(), 2);
    }

    #[test]
    fn test_strategy_from_config_is_used() {
        let config = SyncConfig::default()
            .with_candidate_strategy(CandidateStrategy::LengthBanded { tolerance_pct: 10 });
        let svc = SyncService::new(config);

        // Very different lengths: the banded prefilter rules the pair out
        let now = current_timestamp();
        let items = vec![
            item("a", "short note", now - 100),
            item("b", &format!("short note {}", "padding ".repeat(20)), now),
        ];
        let (state, _) = svc.run_sync(&items, SyncState::new());
        assert_eq!(state.index.len(), 2);
    }

    #[test]
    fn test_counters_accumulate_across_runs() {
        let now = current_timestamp();
        let svc = service();
        let (state, _) = svc.run_sync(&[item("a", "content one", now - 100)], SyncState::new());
        let (state, _) = svc.run_sync(&[item("b", "content two entirely", now)], state);

        assert_eq!(state.counters.total_processed, 2);
        assert_eq!(state.counters.new_inserted, 2);
    }
}
