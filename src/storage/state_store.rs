//! Atomic snapshot storage for [`SyncState`].
//!
//! The snapshot is a single JSON document replaced via write-then-rename,
//! so a crash mid-save never leaves a half-written state file: readers see
//! either the previous snapshot or the new one, never a mix.

use crate::models::{SCHEMA_VERSION, SyncState};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Loads and saves the persisted sync state snapshot.
///
/// # Concurrency
///
/// Single-writer: concurrent saves against the same path must be prevented
/// by the caller (advisory lock or a single scheduler). The store itself
/// only guarantees that each individual save is atomic.
///
/// # Example
///
/// ```rust,no_run
/// use knowsync::{StateStore, SyncState};
///
/// let store = StateStore::new("var/sync_state.json");
/// let state = store.load()?.unwrap_or_else(SyncState::new);
/// store.save(&state)?;
/// # Ok::<(), knowsync::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store for the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the persisted state.
    ///
    /// Returns `Ok(None)` when no snapshot exists yet (first run).
    ///
    /// # Errors
    ///
    /// - [`Error::VersionMismatch`] if the snapshot declares a schema
    ///   version newer than [`SCHEMA_VERSION`]; the file is left untouched
    /// - [`Error::Persistence`] if the file cannot be read or parsed
    #[instrument(skip(self), fields(operation = "state.load", path = %self.path.display()))]
    pub fn load(&self) -> Result<Option<SyncState>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No snapshot found, starting empty");
                return Ok(None);
            },
            Err(e) => {
                return Err(Error::Persistence {
                    operation: "load".to_string(),
                    cause: e.to_string(),
                });
            },
        };

        let state: SyncState =
            serde_json::from_str(&raw).map_err(|e| Error::Persistence {
                operation: "load".to_string(),
                cause: format!("snapshot parse failed: {e}"),
            })?;

        state.check_version()?;

        debug!(
            schema_version = state.schema_version,
            entries = state.index.len(),
            "Snapshot loaded"
        );
        Ok(Some(state))
    }

    /// Persists the state as a single atomic snapshot.
    ///
    /// Writes to a sibling temp file, then renames over the target. The
    /// temp file lives in the same directory so the rename stays on one
    /// filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Persistence`] if serialization, the write, or the
    /// rename fails. The previous snapshot remains valid in every failure
    /// case.
    #[instrument(skip(self, state), fields(operation = "state.save", path = %self.path.display()))]
    pub fn save(&self, state: &SyncState) -> Result<()> {
        debug_assert_eq!(state.schema_version, SCHEMA_VERSION);

        let json =
            serde_json::to_string_pretty(state).map_err(|e| Error::Persistence {
                operation: "save".to_string(),
                cause: format!("snapshot serialization failed: {e}"),
            })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::Persistence {
                operation: "save".to_string(),
                cause: format!("creating snapshot directory failed: {e}"),
            })?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| Error::Persistence {
            operation: "save".to_string(),
            cause: format!("writing temp snapshot failed: {e}"),
        })?;

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            // Best effort: do not leave the temp file behind
            let _ = fs::remove_file(&tmp_path);
            Error::Persistence {
                operation: "save".to_string(),
                cause: format!("atomic rename failed: {e}"),
            }
        })?;

        debug!(entries = state.index.len(), "Snapshot saved");
        metrics::counter!("knowsync_snapshot_saves_total").increment(1);
        Ok(())
    }
}
