//! Sync engine configuration.
//!
//! Configuration is always passed explicitly into [`crate::SyncService`];
//! there is no implicit global state.

use crate::dedup::CandidateStrategy;

/// Configuration for a sync pass.
///
/// # Environment Variables
///
/// | Variable | Type | Default | Description |
/// |----------|------|---------|-------------|
/// | `KNOWSYNC_SIMILARITY_THRESHOLD` | f32 | `0.8` | Near-duplicate similarity threshold |
/// | `KNOWSYNC_MAX_AGE_DAYS` | u64 | `30` | Staleness cutoff for the archival sweep |
/// | `KNOWSYNC_CANDIDATE_STRATEGY` | str | `full_scan` | `full_scan` or `length_banded` |
/// | `KNOWSYNC_REPORT_SAMPLE_SIZE` | usize | `10` | Max duplicate clusters in a report |
///
/// # Example
///
/// ```rust
/// use knowsync::SyncConfig;
///
/// let config = SyncConfig::default();
/// assert!((config.similarity_threshold - 0.8).abs() < f32::EPSILON);
/// assert_eq!(config.max_age_days, 30);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Minimum similarity score for a near-duplicate classification.
    ///
    /// Scores are in `[0.0, 1.0]`; an item whose best candidate score is at
    /// or above this threshold is merged rather than inserted.
    pub similarity_threshold: f32,

    /// Entries unseen for more than this many days are eligible for the
    /// archival sweep (unless they have ever been merged into).
    pub max_age_days: u64,

    /// Candidate lookup strategy for near-duplicate comparison.
    pub candidate_strategy: CandidateStrategy,

    /// Maximum number of duplicate clusters sampled into a report.
    pub report_sample_size: usize,
}

impl SyncConfig {
    /// Creates a new configuration from environment variables.
    ///
    /// Falls back to defaults for any unset or unparsable variables.
    #[must_use]
    pub fn from_env() -> Self {
        let similarity_threshold = std::env::var("KNOWSYNC_SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .map_or(0.8, |t| t.clamp(0.0, 1.0));

        let max_age_days = std::env::var("KNOWSYNC_MAX_AGE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let candidate_strategy = std::env::var("KNOWSYNC_CANDIDATE_STRATEGY")
            .ok()
            .and_then(|v| CandidateStrategy::parse(&v))
            .unwrap_or_default();

        let report_sample_size = std::env::var("KNOWSYNC_REPORT_SAMPLE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Self {
            similarity_threshold,
            max_age_days,
            candidate_strategy,
            report_sample_size,
        }
    }

    /// Builder method to set the similarity threshold.
    ///
    /// The value is clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the staleness cutoff in days.
    #[must_use]
    pub const fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Builder method to set the candidate lookup strategy.
    #[must_use]
    pub const fn with_candidate_strategy(mut self, strategy: CandidateStrategy) -> Self {
        self.candidate_strategy = strategy;
        self
    }

    /// Builder method to set the report sample size.
    #[must_use]
    pub const fn with_report_sample_size(mut self, size: usize) -> Self {
        self.report_sample_size = size;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.8,
            max_age_days: 30,
            candidate_strategy: CandidateStrategy::default(),
            report_sample_size: 10,
        }
    }
}
