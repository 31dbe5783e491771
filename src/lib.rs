//! # Knowsync
//!
//! Idempotent content synchronization with duplicate detection for curated
//! knowledge stores.
//!
//! Knowsync classifies content items captured from a source repository as
//! brand-new, exact duplicates, or near-duplicates, folds near-duplicate
//! provenance into canonical fingerprint entries, sweeps stale unreinforced
//! entries, and persists the whole index as a single atomic snapshot.
//!
//! ## Features
//!
//! - Deterministic content fingerprinting (normalized SHA-256)
//! - Pluggable similarity scoring (lexical by default, embeddings optional)
//! - Single-writer batch passes that are safe to re-run: already-synced
//!   items reclassify as exact duplicates
//! - Crash-safe persistence via write-then-rename snapshots
//!
//! ## Example
//!
//! ```rust
//! use knowsync::{ContentItem, SyncConfig, SyncService, SyncState, current_timestamp};
//!
//! let service = SyncService::new(SyncConfig::default());
//! let items = vec![ContentItem::new(
//!     "note-1",
//!     "Use PostgreSQL for storage",
//!     "notes/db.md",
//!     current_timestamp(),
//! )];
//! let (state, report) = service.run_sync(&items, SyncState::new());
//! assert_eq!(state.index.len(), 1);
//! assert_eq!(report.items_considered, 1);
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod dedup;
pub mod gc;
pub mod models;
pub mod observability;
pub mod services;
pub mod storage;

// Re-exports for convenience
pub use config::SyncConfig;
pub use dedup::{
    CandidateStrategy, Classification, ContentHasher, DuplicateDetector, FingerprintIndex,
    LexicalScorer, SimilarityScorer, normalize,
};
pub use gc::{SweepResult, sweep_stale};
pub use models::{
    ContentItem, DuplicateCluster, FingerprintEntry, SCHEMA_VERSION, SyncCounters, SyncReport,
    SyncState,
};
pub use services::SyncService;
pub use storage::StateStore;

/// Error type for knowsync operations.
///
/// Uses `thiserror` for automatic `Display` and `Error` trait implementations.
///
/// # Error Variant Triggers
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidItem` | An incoming item is missing its source id or raw content |
/// | `VersionMismatch` | A persisted snapshot is newer than this engine understands |
/// | `Persistence` | The atomic snapshot write or the snapshot read fails |
/// | `Scorer` | A pluggable similarity scorer fails on a comparison |
#[derive(Debug, ThisError)]
pub enum Error {
    /// An incoming content item failed validation.
    ///
    /// Raised when:
    /// - `source_id` is empty
    /// - `raw_content` is empty
    ///
    /// Per-item validation failures are counted and skipped by the sync
    /// orchestrator; they never abort a run.
    #[error("invalid item: {0}")]
    InvalidItem(String),

    /// A persisted snapshot declares a schema version newer than this
    /// engine supports.
    ///
    /// Fatal for the run. The snapshot file is left untouched so a newer
    /// engine can still read it.
    #[error("snapshot schema version {found} is newer than supported version {supported}")]
    VersionMismatch {
        /// Schema version found in the snapshot.
        found: u32,
        /// Highest schema version this engine understands.
        supported: u32,
    },

    /// Reading or writing the persisted snapshot failed.
    ///
    /// Fatal for the run. Because snapshots are replaced atomically, the
    /// previous snapshot remains valid and uncorrupted.
    #[error("persistence operation '{operation}' failed: {cause}")]
    Persistence {
        /// The operation that failed (e.g. `load`, `save`).
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// A pluggable similarity scorer failed on a single comparison.
    ///
    /// The detector degrades the failed comparison to "no match" and
    /// continues; this variant only surfaces from scorer implementations
    /// directly.
    #[error("similarity scorer failed: {0}")]
    Scorer(String),
}

/// Result type alias for knowsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the current Unix timestamp in seconds.
///
/// Centralized so every component measures staleness against the same
/// clock. Falls back to 0 if the system clock is before the Unix epoch.
///
/// # Examples
///
/// ```rust
/// use knowsync::current_timestamp;
///
/// let ts = current_timestamp();
/// assert!(ts > 0);
/// ```
#[must_use]
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
