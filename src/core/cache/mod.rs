//! Client-side cache
//!
//! Single-tier LRU cache with per-entry TTL, tag invalidation, regex key
//! listing, and optional snapshot persistence across restarts.

pub mod store;
pub mod types;


pub use store::CacheStore;
pub use types::{CacheEntry, CacheStats};
