//! Stateless duplicate classification.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::index::{CandidateStrategy, FingerprintIndex};
use super::scorer::SimilarityScorer;

/// Classification outcome for one content item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Classification {
    /// No matching entry: the item is brand-new.
    New,
    /// The normalized content hash matches an existing entry exactly.
    ExactDuplicate {
        /// Content hash of the matched entry.
        hash: String,
    },
    /// Below hash equality but at/above the similarity threshold against
    /// an existing entry.
    NearDuplicate {
        /// Content hash of the canonical entry to merge into.
        hash: String,
        /// Best similarity score found.
        score: f32,
    },
}

impl Classification {
    /// Short label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::ExactDuplicate { .. } => "exact_duplicate",
            Self::NearDuplicate { .. } => "near_duplicate",
        }
    }
}

/// Stateless classifier over a fingerprint index.
///
/// Borrows the index and scorer; it never mutates either. Applying a
/// classification (insert, skip, merge) is the orchestrator's job, which
/// keeps classify/apply separable and classification itself idempotent.
pub struct DuplicateDetector<'a, S: SimilarityScorer + ?Sized> {
    index: &'a FingerprintIndex,
    scorer: &'a S,
    threshold: f32,
    strategy: CandidateStrategy,
}

impl<'a, S: SimilarityScorer + ?Sized> DuplicateDetector<'a, S> {
    /// Creates a detector over `index` using `scorer`.
    ///
    /// # Arguments
    ///
    /// * `index` - The fingerprint index to classify against
    /// * `scorer` - Similarity scorer for the near-duplicate tier
    /// * `threshold` - Minimum score for a near-duplicate match
    /// * `strategy` - Candidate lookup strategy
    #[must_use]
    pub const fn new(
        index: &'a FingerprintIndex,
        scorer: &'a S,
        threshold: f32,
        strategy: CandidateStrategy,
    ) -> Self {
        Self {
            index,
            scorer,
            threshold,
            strategy,
        }
    }

    /// Classifies one item given its canonical text and content hash.
    ///
    /// Tiers, cheapest first: exact hash lookup, then best candidate
    /// similarity against the threshold. A scorer failure on a single
    /// candidate is logged and degraded to "no match" for that comparison;
    /// it never aborts classification.
    #[instrument(
        skip(self, canonical),
        fields(
            operation = "classify",
            content_length = canonical.len(),
            candidates = tracing::field::Empty
        )
    )]
    pub fn classify(&self, canonical: &str, content_hash: &str) -> Classification {
        if self.index.lookup_exact(content_hash).is_some() {
            tracing::debug!(hash = %content_hash, "Exact duplicate");
            return Classification::ExactDuplicate {
                hash: content_hash.to_string(),
            };
        }

        let candidates = self.index.candidates(canonical, self.strategy);
        tracing::Span::current().record("candidates", candidates.len());

        let mut best: Option<(&str, f32)> = None;
        for candidate in candidates {
            let score = match self.scorer.score(canonical, &candidate.canonical_excerpt) {
                Ok(score) => score,
                Err(e) => {
                    // Degrade this single comparison to "no match"
                    tracing::warn!(
                        candidate = %candidate.content_hash,
                        error = %e,
                        "Scorer failed for candidate, skipping comparison"
                    );
                    metrics::counter!("knowsync_scorer_failures_total").increment(1);
                    continue;
                },
            };
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((candidate.content_hash.as_str(), score));
            }
        }

        match best {
            Some((hash, score)) if score >= self.threshold => {
                tracing::debug!(hash = %hash, score, threshold = self.threshold, "Near duplicate");
                Classification::NearDuplicate {
                    hash: hash.to_string(),
                    score,
                }
            },
            _ => Classification::New,
        }
    }
}
