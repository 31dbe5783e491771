//! Human-readable run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::state::{SyncCounters, SyncState};

/// Maximum excerpt length carried into a report preview.
const PREVIEW_LEN: usize = 80;

/// A cluster of duplicate content surfaced in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Content hash of the canonical entry.
    pub content_hash: String,
    /// Truncated canonical excerpt for display.
    pub excerpt_preview: String,
    /// Number of distinct source ids observing this content.
    pub source_count: usize,
    /// Near-duplicates merged into the entry.
    pub merge_count: u64,
}

/// Statistics derived from one sync pass.
///
/// Purely derived from the run's counter delta and the resulting state;
/// generating a report never mutates anything. Formatting for CLI or log
/// output is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    /// When the pass started.
    pub run_timestamp: DateTime<Utc>,
    /// Items handed to the pass, including ones that failed validation.
    pub items_considered: u64,
    /// `(exact_duplicates + near_duplicates_merged) / total_processed` for
    /// this run, in `[0.0, 1.0]`.
    pub dedup_ratio: f32,
    /// Counter increments accumulated by this run.
    pub delta: SyncCounters,
    /// Recommendation derived from the duplicate ratio.
    pub recommendation: String,
    /// Bounded sample of the largest duplicate clusters.
    pub top_clusters: Vec<DuplicateCluster>,
}

impl SyncReport {
    /// Builds a report from a run's counter delta and the post-run state.
    ///
    /// # Arguments
    ///
    /// * `run_timestamp` - When the pass started
    /// * `items_considered` - Size of the input batch
    /// * `delta` - Counter increments from this run
    /// * `state` - State after the run, for cluster sampling
    /// * `sample_size` - Maximum clusters to include
    #[must_use]
    pub fn from_run(
        run_timestamp: DateTime<Utc>,
        items_considered: u64,
        delta: SyncCounters,
        state: &SyncState,
        sample_size: usize,
    ) -> Self {
        let dedup_ratio = delta.dedup_ratio();
        let recommendation = recommendation_for(dedup_ratio * 100.0).to_string();
        let top_clusters = top_clusters(state, sample_size);

        Self {
            run_timestamp,
            items_considered,
            dedup_ratio,
            delta,
            recommendation,
            top_clusters,
        }
    }

    /// One-line human summary of the pass.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} items: {} new, {} exact, {} merged, {} archived, {} errors ({:.1}% duplicates)",
            self.items_considered,
            self.delta.new_inserted,
            self.delta.exact_duplicates,
            self.delta.near_duplicates_merged,
            self.delta.archived,
            self.delta.errors,
            self.dedup_ratio * 100.0
        )
    }
}

/// Maps a duplicate percentage to a maintenance recommendation.
///
/// # Example
///
/// ```rust
/// use knowsync::models::recommendation_for;
///
/// assert!(recommendation_for(2.0).contains("well-managed"));
/// assert!(recommendation_for(45.0).contains("strongly recommended"));
/// ```
#[must_use]
pub fn recommendation_for(duplicate_pct: f32) -> &'static str {
    if duplicate_pct < 5.0 {
        "Content is well-managed with minimal duplicates."
    } else if duplicate_pct < 15.0 {
        "Some duplicates found. Consider running periodic deduplication."
    } else if duplicate_pct < 30.0 {
        "Significant duplicates detected. Deduplication recommended."
    } else {
        "High duplicate ratio. Immediate deduplication strongly recommended."
    }
}

/// Samples the largest duplicate clusters from the index.
///
/// Ranked by reinforcement: merges plus extra source refs. Entries that
/// never collected a duplicate are skipped.
fn top_clusters(state: &SyncState, sample_size: usize) -> Vec<DuplicateCluster> {
    let mut clusters: Vec<(u64, DuplicateCluster)> = state
        .index
        .iter()
        .filter_map(|entry| {
            let weight = entry.merge_count + (entry.source_refs.len() as u64).saturating_sub(1);
            if weight == 0 {
                return None;
            }
            let excerpt_preview: String = entry.canonical_excerpt.chars().take(PREVIEW_LEN).collect();
            Some((
                weight,
                DuplicateCluster {
                    content_hash: entry.content_hash.clone(),
                    excerpt_preview,
                    source_count: entry.source_refs.len(),
                    merge_count: entry.merge_count,
                },
            ))
        })
        .collect();

    // Heaviest first; ties break on hash for deterministic output
    clusters.sort_by(|(wa, ca), (wb, cb)| wb.cmp(wa).then_with(|| ca.content_hash.cmp(&cb.content_hash)));
    clusters
        .into_iter()
        .take(sample_size)
        .map(|(_, cluster)| cluster)
        .collect()
}
