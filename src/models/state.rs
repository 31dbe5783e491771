//! The persisted sync state aggregate.

use crate::dedup::FingerprintIndex;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Highest snapshot schema version this engine understands.
///
/// Snapshots declaring a newer version are rejected on load with
/// [`Error::VersionMismatch`]; the file is left untouched.
pub const SCHEMA_VERSION: u32 = 1;

/// Monotonic run counters.
///
/// Counters only ever increase within a state's lifetime, except through
/// the explicit [`SyncCounters::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCounters {
    /// Items successfully classified and applied.
    pub total_processed: u64,
    /// Items whose normalized hash matched an existing entry.
    pub exact_duplicates: u64,
    /// Items merged into a canonical entry as near-duplicates.
    pub near_duplicates_merged: u64,
    /// Items inserted as brand-new entries.
    pub new_inserted: u64,
    /// Exact-duplicate hits that attached a previously unseen source id to
    /// an existing entry.
    pub updated: u64,
    /// Entries removed by the archival sweep.
    pub archived: u64,
    /// Items rejected or failed and skipped.
    pub errors: u64,
}

impl SyncCounters {
    /// Resets all counters to zero.
    ///
    /// The only sanctioned way for counters to decrease.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns the counter increments accumulated since `before`.
    #[must_use]
    pub const fn delta_since(&self, before: &Self) -> Self {
        Self {
            total_processed: self.total_processed.saturating_sub(before.total_processed),
            exact_duplicates: self.exact_duplicates.saturating_sub(before.exact_duplicates),
            near_duplicates_merged: self
                .near_duplicates_merged
                .saturating_sub(before.near_duplicates_merged),
            new_inserted: self.new_inserted.saturating_sub(before.new_inserted),
            updated: self.updated.saturating_sub(before.updated),
            archived: self.archived.saturating_sub(before.archived),
            errors: self.errors.saturating_sub(before.errors),
        }
    }

    /// Duplicate ratio for these counters: `(exact + near) / processed`.
    ///
    /// Returns `0.0` when nothing was processed.
    #[must_use]
    pub fn dedup_ratio(&self) -> f32 {
        if self.total_processed == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)] // counter magnitudes are far below f32 precision loss
        {
            (self.exact_duplicates + self.near_duplicates_merged) as f32
                / self.total_processed as f32
        }
    }
}

/// Root aggregate persisted between sync passes.
///
/// Created empty on first run, mutated exactly once per item per
/// classification outcome during a pass, and persisted as a single atomic
/// snapshot at end of run. Entries leave the index only through the
/// archival sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncState {
    /// Snapshot schema version, checked on load.
    pub schema_version: u32,
    /// When the last sync pass ran, `None` before the first pass.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Content hash → fingerprint entry.
    pub index: FingerprintIndex,
    /// Source id → knowledge-store target id.
    ///
    /// Values reference only target ids belonging to an already-synced
    /// entry.
    pub external_mappings: BTreeMap<String, String>,
    /// Lifetime run counters.
    pub counters: SyncCounters,
}

impl SyncState {
    /// Creates an empty state at the current schema version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            last_sync_at: None,
            index: FingerprintIndex::new(),
            external_mappings: BTreeMap::new(),
            counters: SyncCounters::default(),
        }
    }

    /// Verifies that this state's schema version is understood.
    ///
    /// # Errors
    ///
    /// Returns [`Error::VersionMismatch`] if the state was written by a
    /// newer engine.
    pub const fn check_version(&self) -> Result<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(Error::VersionMismatch {
                found: self.schema_version,
                supported: SCHEMA_VERSION,
            });
        }
        Ok(())
    }

    /// Records the knowledge-store id assigned to an entry after an
    /// external push, and maps every source ref of that entry to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidItem`] if no entry exists for
    /// `content_hash`.
    pub fn assign_target(
        &mut self,
        content_hash: &str,
        target_id: impl Into<String>,
    ) -> Result<()> {
        let target_id = target_id.into();
        let entry = self.index.entry_mut(content_hash).ok_or_else(|| {
            Error::InvalidItem(format!("unknown content hash '{content_hash}'"))
        })?;
        entry.target_id = Some(target_id.clone());
        for source_id in &entry.source_refs {
            self.external_mappings
                .insert(source_id.clone(), target_id.clone());
        }
        Ok(())
    }

    /// Maps a source id to the target of an already-synced entry, if the
    /// entry has one.
    ///
    /// No-op for entries that have not been pushed yet; their refs are
    /// mapped later by [`Self::assign_target`].
    pub fn link_source(&mut self, source_id: &str, content_hash: &str) {
        if let Some(target_id) = self
            .index
            .lookup_exact(content_hash)
            .and_then(|entry| entry.target_id.clone())
        {
            self.external_mappings
                .insert(source_id.to_string(), target_id);
        }
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}
