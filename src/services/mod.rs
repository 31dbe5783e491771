//! Services orchestrating the sync pipeline.

mod sync;

pub use sync::SyncService;
