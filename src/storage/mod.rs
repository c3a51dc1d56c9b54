//! Storage layer
//!
//! On-disk persistence for the client cache.

pub mod snapshot;

pub use snapshot::SnapshotStore;
