//! Data models for the sync engine.

mod entry;
mod item;
mod report;
mod state;

pub use entry::FingerprintEntry;
pub use item::ContentItem;
pub use report::{DuplicateCluster, SyncReport, recommendation_for};
pub use state::{SCHEMA_VERSION, SyncCounters, SyncState};
