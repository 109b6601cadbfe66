//! Expiring cache keyed by query fingerprint

use crate::cache::{
    config::CacheConfig,
    entry::CachedEntry,
    policy::CachePolicy,
    types::{CacheStats, Fingerprint},
};
use crate::error::{Result, TableError};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Fingerprint → value map whose entries expire under their own policy
///
/// - Thread-safe async access via `RwLock`; share it with `Arc`
/// - Absolute, relative and sliding expiration per entry
/// - LRU eviction above `max_entries`, skipping `NotRemovable` entries
///
/// Concurrent misses on the same fingerprint are not coordinated: each caller
/// computes its own value and the last `set` wins.
pub struct ExpiringCache<V> {
    /// Cache configuration
    pub(crate) config: CacheConfig,

    /// Internal storage
    store: RwLock<CacheStore<V>>,
}

/// Internal cache storage
struct CacheStore<V> {
    /// Main storage: fingerprint -> entry
    entries: HashMap<Fingerprint, CachedEntry<V>>,

    /// LRU tracking: fingerprint -> sequence of its last touch
    lru_index: HashMap<Fingerprint, u64>,

    /// LRU tracking: sequence -> fingerprint, oldest first
    lru_order: BTreeMap<u64, Fingerprint>,

    /// Next touch sequence number
    next_seq: u64,

    /// Current cache statistics
    stats: CacheStats,
}

impl<V> CacheStore<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru_index: HashMap::new(),
            lru_order: BTreeMap::new(),
            next_seq: 0,
            stats: CacheStats::default(),
        }
    }

    fn remove_entry(&mut self, fingerprint: &str) -> Option<CachedEntry<V>> {
        let entry = self.entries.remove(fingerprint)?;
        if let Some(seq) = self.lru_index.remove(fingerprint) {
            self.lru_order.remove(&seq);
        }
        Some(entry)
    }

    fn touch(&mut self, fingerprint: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;

        if let Some(previous) = self.lru_index.insert(fingerprint.to_string(), seq) {
            self.lru_order.remove(&previous);
        }
        self.lru_order.insert(seq, fingerprint.to_string());
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lru_index.clear();
        self.lru_order.clear();
    }

    /// Least recently used entry that capacity eviction may drop
    fn eviction_candidate(&self) -> Option<Fingerprint> {
        self.lru_order
            .values()
            .find(|key| {
                self.entries
                    .get(*key)
                    .map_or(true, |entry| entry.metadata.priority.is_removable())
            })
            .cloned()
    }

    fn expired_keys(&self, now: DateTime<Utc>) -> Vec<Fingerprint> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a new cache with the given configuration
    ///
    /// An invalid configuration is logged and used as given; out-of-range
    /// jitter is clamped when applied. Use [`ExpiringCache::try_new`] to reject it.
    pub fn new(config: CacheConfig) -> Self {
        info!("Initializing expiring cache with config: {:?}", config);
        if let Err(e) = config.validate() {
            warn!("Expiring cache created with invalid config: {}", e);
        }

        Self {
            config,
            store: RwLock::new(CacheStore::new()),
        }
    }

    /// Create a new cache, failing with `ConfigError` on an invalid configuration
    pub fn try_new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a cache with default configuration
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Look up a live entry
    ///
    /// Returns `None` when the fingerprint is absent or its entry has expired;
    /// an expired entry is dropped on the way. A hit restarts the entry's
    /// sliding window.
    pub async fn try_get(&self, fingerprint: &str) -> Option<V> {
        let now = Utc::now();
        let mut store = self.store.write().await;

        let expired = store
            .entries
            .get(fingerprint)
            .map(|entry| entry.is_expired_at(now));

        let Some(expired) = expired else {
            debug!("Cache miss: {}", fingerprint);
            self.record(&mut store.stats, |s| s.misses += 1);
            return None;
        };

        if expired {
            debug!("Cache entry expired: {}", fingerprint);
            store.remove_entry(fingerprint);
            self.record(&mut store.stats, |s| {
                s.misses += 1;
                s.expirations += 1;
            });
            return None;
        }

        let value = store.entries.get_mut(fingerprint).map(|entry| {
            entry.mark_accessed(now);
            entry.value.clone()
        });

        store.touch(fingerprint);
        self.record(&mut store.stats, |s| s.hits += 1);

        debug!("Cache hit: {}", fingerprint);
        value
    }

    /// Insert or replace the entry for `fingerprint`
    ///
    /// Expiration is computed from `policy` now.
    pub async fn set(
        &self,
        fingerprint: impl Into<Fingerprint>,
        value: V,
        policy: &CachePolicy,
    ) -> Result<()> {
        let fingerprint = fingerprint.into();
        if fingerprint.trim().is_empty() {
            return Err(TableError::InvalidArgument(
                "fingerprint must not be empty".to_string(),
            ));
        }
        policy.validate()?;

        let now = Utc::now();
        let ttl = policy.time_to_live.map(|ttl| self.config.ttl_with_jitter(ttl));
        let entry = CachedEntry::new(value, policy, ttl, now);

        let mut store = self.store.write().await;

        if store.entries.contains_key(&fingerprint) {
            debug!("Replacing cache entry: {}", fingerprint);
        } else {
            self.evict_if_needed(&mut store, now);
            debug!("Inserting cache entry: {}", fingerprint);
        }

        store.touch(&fingerprint);
        store.entries.insert(fingerprint, entry);

        Ok(())
    }

    /// Check if a fingerprint is present (without updating access time)
    ///
    /// Expired entries that have not been swept yet still count.
    pub async fn contains_key(&self, fingerprint: &str) -> bool {
        let store = self.store.read().await;
        store.entries.contains_key(fingerprint)
    }

    /// Remove a specific entry from the cache
    pub async fn remove(&self, fingerprint: &str) -> Option<V> {
        let mut store = self.store.write().await;
        let entry = store.remove_entry(fingerprint)?;
        self.record(&mut store.stats, |s| s.invalidations += 1);

        debug!("Removed cache entry: {}", fingerprint);
        Some(entry.value)
    }

    /// Clear all entries from the cache, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut store = self.store.write().await;

        let count = store.entries.len();
        store.clear();
        self.record(&mut store.stats, |s| s.invalidations += count as u64);

        info!("Cleared {} entries from cache", count);
        count
    }

    /// Remove all expired entries, returning their fingerprints
    pub async fn cleanup_expired(&self) -> Vec<Fingerprint> {
        let now = Utc::now();
        let mut store = self.store.write().await;

        let expired = store.expired_keys(now);
        for key in &expired {
            store.remove_entry(key);
        }

        if !expired.is_empty() {
            let count = expired.len() as u64;
            self.record(&mut store.stats, |s| s.expirations += count);
            debug!("Cleaned up {} expired entries", expired.len());
        }

        expired
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        CacheStats {
            entries: store.entries.len(),
            ..store.stats.clone()
        }
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }

    fn record(&self, stats: &mut CacheStats, update: impl FnOnce(&mut CacheStats)) {
        if self.config.enable_metrics {
            update(stats);
        }
    }

    /// Internal: make room for one more entry
    fn evict_if_needed(&self, store: &mut CacheStore<V>, now: DateTime<Utc>) {
        if store.entries.len() < self.config.max_entries {
            return;
        }

        // Expired entries go first.
        let expired = store.expired_keys(now);
        for key in &expired {
            store.remove_entry(key);
        }
        let count = expired.len() as u64;
        self.record(&mut store.stats, |s| s.expirations += count);

        while store.entries.len() >= self.config.max_entries {
            let Some(key) = store.eviction_candidate() else {
                warn!(
                    "Cache holds {} non-removable entries, exceeding max_entries {}",
                    store.entries.len(),
                    self.config.max_entries
                );
                break;
            };

            debug!("Evicting entry due to max_entries limit: {}", key);
            store.remove_entry(&key);
            self.record(&mut store.stats, |s| s.evictions += 1);
        }
    }
}

impl<V> Default for ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Background task for automatic cache cleanup
pub async fn start_auto_cleanup<V>(cache: Arc<ExpiringCache<V>>)
where
    V: Clone + Send + Sync + 'static,
{
    let interval = cache.config.cleanup_interval;

    info!("Starting automatic cache cleanup task (interval: {:?})", interval);

    loop {
        tokio::time::sleep(interval).await;

        let removed = cache.cleanup_expired().await;
        if !removed.is_empty() {
            debug!("Auto cleanup removed {} entries", removed.len());
        }
    }
}

/// Spawn [`start_auto_cleanup`] when the configuration enables it
pub fn spawn_auto_cleanup<V>(cache: Arc<ExpiringCache<V>>) -> Option<JoinHandle<()>>
where
    V: Clone + Send + Sync + 'static,
{
    if !cache.config.enable_auto_cleanup {
        return None;
    }
    Some(tokio::spawn(start_auto_cleanup(cache)))
}
