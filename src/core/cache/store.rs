//! Cache store implementation
//!
//! LRU cache with per-entry TTL, tag invalidation, and optional snapshot
//! persistence. Expired entries are dropped lazily on access and by a
//! background sweeper. When a snapshot store is attached, every mutation is
//! written through to disk (or marked dirty for the debounced flusher when a
//! debounce interval is configured).

use super::types::{estimate_size, AtomicCacheStats, CacheEntry, CacheStats};
use crate::config::CacheSettings;
use crate::storage::SnapshotStore;
use crate::utils::error::{Result, WoundsightError};
use chrono::Utc;
use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// LRU cache with TTL, tags, and snapshot persistence
pub struct CacheStore {
    /// Entries in recency order; the LRU end is the oldest last access
    entries: RwLock<LruCache<String, CacheEntry>>,
    /// Cache configuration
    settings: CacheSettings,
    /// Cache statistics (lock-free atomics for hot path)
    stats: AtomicCacheStats,
    /// Snapshot persistence, when enabled
    snapshot: Option<SnapshotStore>,
    /// Set when a mutation happened since the last debounced flush
    dirty: AtomicBool,
    /// Background maintenance tasks
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CacheStore {
    /// Create a new in-memory cache store
    pub fn new(settings: CacheSettings) -> Result<Self> {
        Self::build(settings, None)
    }

    /// Create a cache store backed by a snapshot file
    pub fn with_snapshot(settings: CacheSettings, snapshot: SnapshotStore) -> Result<Self> {
        Self::build(settings, Some(snapshot))
    }

    fn build(settings: CacheSettings, snapshot: Option<SnapshotStore>) -> Result<Self> {
        // Ensure we have a reasonable minimum capacity
        let capacity = NonZeroUsize::new(settings.max_size)
            .or_else(|| NonZeroUsize::new(100))
            .ok_or_else(|| {
                WoundsightError::config("cache max_size must be greater than 0")
            })?;

        Ok(Self {
            entries: RwLock::new(LruCache::new(capacity)),
            settings,
            stats: AtomicCacheStats::default(),
            snapshot,
            dirty: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Restore entries from the snapshot file, skipping any that expired
    /// while the client was offline. Returns the number of restored entries.
    pub async fn load_persisted(&self) -> Result<usize> {
        let snapshot = match &self.snapshot {
            Some(snapshot) => snapshot,
            None => return Ok(0),
        };

        let records = snapshot.load().await?;
        let now = Utc::now().timestamp_millis();
        let mut live: Vec<(String, CacheEntry)> = records
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .collect();

        // Insert oldest access first so the LRU order matches access times;
        // when the snapshot exceeds capacity, keep the most recently used
        live.sort_by_key(|(_, entry)| entry.last_accessed);
        let capacity = self.entries.read().cap().get();
        if live.len() > capacity {
            live.drain(0..live.len() - capacity);
        }

        let count = live.len();
        let mut entries = self.entries.write();
        for (key, mut entry) in live {
            entry.size_bytes = estimate_size(&entry.data);
            self.stats.reserve_bytes(entry.size_bytes);
            entries.put(key, entry);
        }
        drop(entries);

        if count > 0 {
            info!("Restored {} cache entries from snapshot", count);
        }
        Ok(count)
    }

    /// Get a cached value decoded into the requested type. A stored value
    /// that no longer matches the type is treated as a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_value(key).await?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                warn!("Cached value for '{}' does not match requested type: {}", key, e);
                None
            }
        }
    }

    /// Get a cached value, dropping it first if its TTL passed
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        let mut flush = false;
        let value = {
            let mut entries = self.entries.write();
            match entries.peek(key).map(CacheEntry::is_expired) {
                Some(true) => {
                    if let Some(old) = entries.pop(key) {
                        self.stats.release_bytes(old.size_bytes);
                        self.stats.record_expired();
                        debug!("Dropped expired cache entry: {}", key);
                    }
                    self.stats.record_miss();
                    flush = true;
                    None
                }
                Some(false) => {
                    // get_mut also promotes the key to most recently used
                    entries.get_mut(key).map(|entry| {
                        entry.mark_accessed();
                        self.stats.record_hit();
                        entry.data.clone()
                    })
                }
                None => {
                    self.stats.record_miss();
                    None
                }
            }
        };

        if flush {
            self.flush_write_through().await;
        }
        value
    }

    /// Store a value under a key with an optional TTL override and tags.
    /// When the cache is full, exactly one entry (the one with the oldest
    /// last access) is evicted first. Replacing an existing key is not an
    /// eviction.
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
        tags: &[&str],
    ) -> Result<()> {
        let data = serde_json::to_value(value)?;
        let ttl = ttl.unwrap_or_else(|| self.settings.default_ttl());
        let tags: HashSet<String> = tags.iter().map(|tag| tag.to_string()).collect();
        let entry = CacheEntry::new(data, ttl, tags);

        {
            let mut entries = self.entries.write();
            if let Some(old) = entries.pop(key) {
                self.stats.release_bytes(old.size_bytes);
            } else if entries.len() >= entries.cap().get() {
                if let Some((evicted_key, evicted)) = entries.pop_lru() {
                    self.stats.release_bytes(evicted.size_bytes);
                    self.stats.record_eviction();
                    debug!("Evicted least recently used cache entry: {}", evicted_key);
                }
            }
            self.stats.reserve_bytes(entry.size_bytes);
            self.stats.record_set();
            entries.put(key.to_string(), entry);
        }

        self.flush_write_through().await;
        Ok(())
    }

    /// Check for a live entry without counting a hit or refreshing recency
    pub async fn has(&self, key: &str) -> bool {
        let (present, flush) = {
            let mut entries = self.entries.write();
            match entries.peek(key).map(CacheEntry::is_expired) {
                Some(true) => {
                    if let Some(old) = entries.pop(key) {
                        self.stats.release_bytes(old.size_bytes);
                        self.stats.record_expired();
                    }
                    (false, true)
                }
                Some(false) => (true, false),
                None => (false, false),
            }
        };

        if flush {
            self.flush_write_through().await;
        }
        present
    }

    /// Remove a single entry. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> bool {
        let removed = {
            let mut entries = self.entries.write();
            match entries.pop(key) {
                Some(old) => {
                    self.stats.release_bytes(old.size_bytes);
                    self.stats.record_delete();
                    true
                }
                None => false,
            }
        };

        if removed {
            self.flush_write_through().await;
        }
        removed
    }

    /// Drop every entry and reset statistics
    pub async fn clear(&self) {
        self.entries.write().clear();
        self.stats.reset();
        info!("Cache cleared");
        self.flush_write_through().await;
    }

    /// Remove every entry carrying at least one of the given tags.
    /// Returns the number of removed entries.
    pub async fn clear_by_tags(&self, tags: &[&str]) -> usize {
        let removed = {
            let mut entries = self.entries.write();
            let matching: Vec<String> = entries
                .iter()
                .filter(|(_, entry)| entry.has_any_tag(tags))
                .map(|(key, _)| key.clone())
                .collect();
            for key in &matching {
                if let Some(old) = entries.pop(key) {
                    self.stats.release_bytes(old.size_bytes);
                    self.stats.record_delete();
                }
            }
            matching.len()
        };

        if removed > 0 {
            debug!("Cleared {} cache entries tagged {:?}", removed, tags);
            self.flush_write_through().await;
        }
        removed
    }

    /// List live keys, optionally filtered by a regex pattern. Expired
    /// entries are excluded but left in place for the sweeper.
    pub fn keys(&self, pattern: Option<&str>) -> Result<Vec<String>> {
        let matcher = match pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|e| {
                WoundsightError::validation(format!("invalid key pattern '{}': {}", pattern, e))
            })?),
            None => None,
        };

        let entries = self.entries.read();
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired())
            .filter(|(key, _)| matcher.as_ref().map(|m| m.is_match(key)).unwrap_or(true))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Return the cached value for `key`, or run `loader` and cache its
    /// result. Concurrent callers for the same missing key may each run the
    /// loader; the last write wins, which is acceptable for the read-mostly
    /// reference data this is used for.
    pub async fn preload<T, F, Fut>(
        &self,
        key: &str,
        loader: F,
        ttl: Option<Duration>,
        tags: &[&str],
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = loader().await?;
        self.set(key, &value, ttl, tags).await?;
        Ok(value)
    }

    /// Drop every expired entry. Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Utc::now().timestamp_millis();
        let mut entries = self.entries.write();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            if let Some(old) = entries.pop(key) {
                self.stats.release_bytes(old.size_bytes);
                self.stats.record_expired();
            }
        }
        expired.len()
    }

    /// Spawn the background sweeper and, when persistence is debounced, the
    /// snapshot flusher. Calling this twice is a no-op.
    pub fn start_maintenance(self: &Arc<Self>) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return;
        }

        let store = Arc::clone(self);
        tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(store.settings.cleanup_interval());
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired();
                if removed > 0 {
                    debug!("Swept {} expired cache entries", removed);
                    store.flush_write_through().await;
                }
            }
        }));

        if self.snapshot.is_some() && !self.settings.persist_debounce().is_zero() {
            let store = Arc::clone(self);
            tasks.push(tokio::spawn(async move {
                let mut ticker = tokio::time::interval(store.settings.persist_debounce());
                loop {
                    ticker.tick().await;
                    if store.dirty.swap(false, Ordering::AcqRel) {
                        if let Err(e) = store.persist().await {
                            warn!("Failed to persist cache snapshot: {}", e);
                        }
                    }
                }
            }));
        }
    }

    /// Write the current entries to the snapshot file
    pub async fn persist(&self) -> Result<()> {
        let snapshot = match &self.snapshot {
            Some(snapshot) => snapshot,
            None => return Ok(()),
        };

        let records: HashMap<String, CacheEntry> = {
            let entries = self.entries.read();
            entries
                .iter()
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect()
        };
        snapshot.save(&records).await
    }

    /// Stop maintenance tasks and write a final snapshot
    pub async fn shutdown(&self) {
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            task.abort();
        }

        if self.snapshot.is_some() {
            if let Err(e) = self.persist().await {
                warn!("Failed to persist cache snapshot on shutdown: {}", e);
            }
        }
        debug!("Cache store shut down");
    }

    /// Get cache statistics (lock-free snapshot)
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.len())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    async fn flush_write_through(&self) {
        if self.snapshot.is_none() {
            return;
        }
        if !self.settings.persist_debounce().is_zero() {
            self.dirty.store(true, Ordering::Release);
            return;
        }
        if let Err(e) = self.persist().await {
            warn!("Failed to persist cache snapshot: {}", e);
        }
    }
}
