//! Similarity scoring between canonical texts.
//!
//! The detector depends only on the [`SimilarityScorer`] trait, so an
//! embedding-based cosine scorer can be substituted for the default
//! lexical one without modifying classification logic.

use crate::Result;

/// Scores the similarity of two canonical texts.
///
/// # Contract
///
/// - `score(a, b)` is in `[0.0, 1.0]`
/// - symmetric: `score(a, b) == score(b, a)`
/// - reflexive: `score(a, a) == 1.0`
///
/// Implementations may fail per comparison (e.g. a remote embedding
/// backend); the detector degrades a failed comparison to "no match"
/// rather than aborting the run.
pub trait SimilarityScorer: Send + Sync {
    /// Returns the similarity of `a` and `b`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Scorer`] if the comparison fails.
    fn score(&self, a: &str, b: &str) -> Result<f32>;
}

/// Default lexical scorer: normalized Levenshtein similarity.
///
/// `1.0 - distance / max_len`, which matches the "alignment ratio"
/// behavior of classic sequence matchers closely enough for prose-sized
/// content. Pure string comparison; no model, no IO.
///
/// # Example
///
/// ```rust
/// use knowsync::{LexicalScorer, SimilarityScorer};
///
/// let scorer = LexicalScorer;
/// assert!((scorer.score("same text", "same text").unwrap() - 1.0).abs() < f32::EPSILON);
/// assert!(scorer.score("alpha", "omega").unwrap() < 0.5);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalScorer;

impl SimilarityScorer for LexicalScorer {
    #[allow(clippy::cast_possible_truncation)] // f64 -> f32 on a [0,1] value
    fn score(&self, a: &str, b: &str) -> Result<f32> {
        if a.is_empty() && b.is_empty() {
            return Ok(1.0);
        }
        let ratio = strsim::normalized_levenshtein(a, b) as f32;
        Ok(ratio.clamp(0.0, 1.0))
    }
}
