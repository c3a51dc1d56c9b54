//! Cache type definitions
//!
//! Entry and statistics types for the client cache. Entries carry wall-clock
//! timestamps in unix milliseconds so they survive serialization to the
//! snapshot file; the wire field names are camelCase for compatibility with
//! snapshots written by earlier clients.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Cache entry with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached value
    pub data: Value,
    /// When the entry was created, unix millis
    pub timestamp: i64,
    /// When the entry expires, unix millis
    pub expires: i64,
    /// Access count for popularity tracking
    #[serde(default)]
    pub hit_count: u64,
    /// Last access time, unix millis
    #[serde(default)]
    pub last_accessed: i64,
    /// Tags for group invalidation
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Estimated size in bytes, recomputed on load
    #[serde(skip)]
    pub size_bytes: usize,
}

impl CacheEntry {
    /// Create a new cache entry
    pub fn new(data: Value, ttl: Duration, tags: HashSet<String>) -> Self {
        let now = Utc::now().timestamp_millis();
        let size_bytes = estimate_size(&data);
        Self {
            data,
            timestamp: now,
            expires: now.saturating_add(ttl.as_millis() as i64),
            hit_count: 0,
            last_accessed: now,
            tags,
            size_bytes,
        }
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    /// Check expiry against a supplied clock reading
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms > self.expires
    }

    /// Mark the entry as accessed
    pub fn mark_accessed(&mut self) {
        self.hit_count += 1;
        self.last_accessed = Utc::now().timestamp_millis();
    }

    /// True if the entry carries at least one of the given tags
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tags.contains(*tag))
    }
}

/// Estimate the size of a value in bytes based on its JSON serialization
pub(crate) fn estimate_size(data: &Value) -> usize {
    serde_json::to_string(data).map(|s| s.len()).unwrap_or(0)
}

/// Atomic cache statistics for lock-free hot path updates
#[derive(Debug, Default)]
pub struct AtomicCacheStats {
    /// Cache hits
    pub hits: AtomicU64,
    /// Cache misses
    pub misses: AtomicU64,
    /// Writes
    pub sets: AtomicU64,
    /// Explicit deletions, including tag invalidation
    pub deletes: AtomicU64,
    /// Capacity evictions
    pub evictions: AtomicU64,
    /// Entries dropped because their TTL passed
    pub expired: AtomicU64,
    /// Total cached size in bytes
    pub memory_bytes: AtomicUsize,
}

impl AtomicCacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_expired(&self) {
        self.expired.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reserve_bytes(&self, bytes: usize) {
        self.memory_bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn release_bytes(&self, bytes: usize) {
        // Saturating subtraction so a stale release can never wrap
        let current = self.memory_bytes.load(Ordering::Relaxed);
        self.memory_bytes
            .store(current.saturating_sub(bytes), Ordering::Relaxed);
    }

    /// Create a snapshot of current stats
    pub fn snapshot(&self, entries: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            entries,
            memory_bytes: self.memory_bytes.load(Ordering::Relaxed),
        }
    }

    /// Reset all stats to zero
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.sets.store(0, Ordering::Relaxed);
        self.deletes.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        self.expired.store(0, Ordering::Relaxed);
        self.memory_bytes.store(0, Ordering::Relaxed);
    }
}

/// Cache statistics snapshot (returned to callers)
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    /// Cache hits
    pub hits: u64,
    /// Cache misses
    pub misses: u64,
    /// Writes
    pub sets: u64,
    /// Explicit deletions, including tag invalidation
    pub deletes: u64,
    /// Capacity evictions
    pub evictions: u64,
    /// Entries dropped because their TTL passed
    pub expired: u64,
    /// Live entries
    pub entries: usize,
    /// Total cached size in bytes
    pub memory_bytes: usize,
}

impl CacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
