//! Snapshot persistence.

mod state_store;

pub use state_store::StateStore;
