//! Bounded, access-expiring store for per-invocation context strings.
//!
//! # Concurrency Model
//!
//! A single `parking_lot::Mutex` guards an `IndexMap` whose order is
//! recency order: the front is the least recently used entry. Every
//! operation is a short critical section (hash lookup plus an index move),
//! so one lock is enough.
//!
//! Entries expire `ttl` after their last access. Expiry is lazy on `get`,
//! and [`ContextCache::cleanup`] sweeps the rest; the background scheduler
//! calls it on a fixed interval.
//!
//! The cache never reports errors. Anything unexpected is treated as a miss.

use agentdeck_state::CacheSettings;
use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

struct CacheEntry {
    value: String,
    last_access: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_access) > ttl
    }
}

/// Counters describing cache behaviour since start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped to make room for new ones.
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed.
    pub expirations: u64,
    pub size: usize,
}

/// LRU cache of context strings keyed by invocation.
pub struct ContextCache {
    entries: Mutex<IndexMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
    key_seq: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl std::fmt::Debug for ContextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextCache")
            .field("ttl", &self.ttl)
            .field("max_entries", &self.max_entries)
            .field("size", &self.approximate_size())
            .finish()
    }
}

impl ContextCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(IndexMap::new()),
            ttl,
            max_entries,
            key_seq: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
        }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_entries, settings.ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// A key unique within this process: `{agent}_{unix_millis}_{seq}`.
    pub fn next_key(&self, agent_name: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let seq = self.key_seq.fetch_add(1, Ordering::Relaxed);
        format!("{agent_name}_{millis}_{seq}")
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.put_at(key.into(), value.into(), Instant::now());
    }

    fn put_at(&self, key: String, value: String, now: Instant) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.lock();

        if let Some(idx) = entries.get_index_of(&key) {
            let last = entries.len() - 1;
            entries.move_index(idx, last);
            if let Some((_, entry)) = entries.get_index_mut(last) {
                entry.value = value;
                entry.last_access = now;
            }
            return;
        }

        if entries.len() >= self.max_entries {
            let removed = self.remove_expired(&mut entries, now);
            if removed > 0 {
                tracing::trace!(target: "agentdeck::cache", removed, "dropped expired contexts on insert");
            }
        }
        while entries.len() >= self.max_entries {
            if entries.shift_remove_index(0).is_none() {
                break;
            }
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                last_access: now,
            },
        );
    }

    /// Look up a context, refreshing its TTL on a hit.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<String> {
        let mut entries = self.entries.lock();
        let Some(idx) = entries.get_index_of(key) else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        };

        let expired = entries
            .get_index(idx)
            .map_or(true, |(_, entry)| entry.is_expired(now, self.ttl));
        if expired {
            entries.shift_remove_index(idx);
            self.expirations.fetch_add(1, Ordering::Relaxed);
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let last = entries.len() - 1;
        entries.move_index(idx, last);
        match entries.get_index_mut(last) {
            Some((_, entry)) => {
                entry.last_access = now;
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn invalidate_all(&self) {
        self.entries.lock().clear();
    }

    /// Remove every expired entry; returns how many were removed.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let mut entries = self.entries.lock();
        self.remove_expired(&mut entries, now)
    }

    fn remove_expired(&self, entries: &mut IndexMap<String, CacheEntry>, now: Instant) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, self.ttl));
        let removed = before - entries.len();
        self.expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Current entry count, including entries that have expired but not
    /// yet been swept.
    pub fn approximate_size(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            size: self.approximate_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn put_then_get_round_trips() {
        let cache = ContextCache::new(10, TTL);
        cache.put("k", "v");
        assert_eq!(cache.get("k").as_deref(), Some("v"));
        assert_eq!(cache.get("missing"), None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn reads_within_ttl_keep_entry_alive() {
        let cache = ContextCache::new(10, TTL);
        let t0 = Instant::now();
        cache.put_at("k".into(), "v".into(), t0);

        // Each read lands inside the TTL window of the previous access,
        // while the total span is several TTLs.
        for step in 1..=5u32 {
            let at = t0 + Duration::from_secs(50) * step;
            assert_eq!(cache.get_at("k", at).as_deref(), Some("v"));
        }
    }

    #[test]
    fn untouched_entry_expires() {
        let cache = ContextCache::new(10, TTL);
        let t0 = Instant::now();
        cache.put_at("k".into(), "v".into(), t0);

        assert_eq!(cache.get_at("k", t0 + TTL + Duration::from_secs(1)), None);
        assert_eq!(cache.approximate_size(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn capacity_evicts_least_recently_used() {
        let cache = ContextCache::new(3, TTL);
        let t0 = Instant::now();
        cache.put_at("a".into(), "1".into(), t0);
        cache.put_at("b".into(), "2".into(), t0);
        cache.put_at("c".into(), "3".into(), t0);

        // Touch "a" so "b" becomes the oldest.
        assert!(cache.get_at("a", t0).is_some());
        cache.put_at("d".into(), "4".into(), t0);

        assert_eq!(cache.approximate_size(), 3);
        assert!(cache.get_at("b", t0).is_none());
        assert!(cache.get_at("a", t0).is_some());
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn many_distinct_keys_stay_bounded() {
        let cache = ContextCache::new(16, TTL);
        for i in 0..500 {
            cache.put(format!("key-{i}"), "ctx");
            assert!(cache.approximate_size() <= 16);
        }
        assert!(cache.get("key-499").is_some());
        assert!(cache.get("key-0").is_none());
    }

    #[test]
    fn concurrent_writers_and_readers_stay_bounded() {
        const MAX: usize = 32;
        const WRITERS: usize = 4;
        const READERS: usize = 4;
        const KEYS: usize = 200;
        let cache = ContextCache::new(MAX, TTL);

        std::thread::scope(|s| {
            for w in 0..WRITERS {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..KEYS {
                        cache.put(format!("w{w}-{i}"), "ctx");
                        assert!(cache.approximate_size() <= MAX);
                    }
                });
            }
            for r in 0..READERS {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..KEYS {
                        let _ = cache.get(&format!("w{}-{i}", r % WRITERS));
                        assert!(cache.approximate_size() <= MAX);
                    }
                });
            }
        });

        let stats = cache.stats();
        assert!(stats.size <= MAX);
        assert_eq!(stats.hits + stats.misses, (READERS * KEYS) as u64);
        assert!(stats.evictions >= (WRITERS * KEYS - MAX) as u64);
    }

    #[test]
    fn full_cache_prefers_dropping_expired_entries() {
        let cache = ContextCache::new(2, TTL);
        let t0 = Instant::now();
        cache.put_at("stale".into(), "x".into(), t0);
        cache.put_at("fresh".into(), "y".into(), t0 + TTL);

        cache.put_at("new".into(), "z".into(), t0 + TTL + Duration::from_secs(1));

        assert!(cache.get_at("fresh", t0 + TTL + Duration::from_secs(1)).is_some());
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn rewriting_a_key_refreshes_it() {
        let cache = ContextCache::new(2, TTL);
        let t0 = Instant::now();
        cache.put_at("a".into(), "old".into(), t0);
        cache.put_at("b".into(), "b".into(), t0);
        cache.put_at("a".into(), "new".into(), t0);
        cache.put_at("c".into(), "c".into(), t0);

        assert_eq!(cache.get_at("a", t0).as_deref(), Some("new"));
        assert!(cache.get_at("b", t0).is_none());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = ContextCache::new(0, TTL);
        cache.put("k", "v");
        assert_eq!(cache.approximate_size(), 0);
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn cleanup_reports_removed_count() {
        let cache = ContextCache::new(10, TTL);
        let t0 = Instant::now();
        cache.put_at("old-1".into(), "x".into(), t0);
        cache.put_at("old-2".into(), "x".into(), t0);
        cache.put_at("young".into(), "x".into(), t0 + TTL);

        assert_eq!(cache.cleanup_at(t0 + TTL + Duration::from_secs(1)), 2);
        assert_eq!(cache.approximate_size(), 1);
    }

    #[test]
    fn invalidate_all_empties_cache() {
        let cache = ContextCache::new(10, TTL);
        cache.put("a", "1");
        cache.put("b", "2");
        cache.invalidate_all();
        assert_eq!(cache.approximate_size(), 0);
    }

    #[test]
    fn generated_keys_never_collide() {
        let cache = ContextCache::new(10, TTL);
        let a = cache.next_key("debugger");
        let b = cache.next_key("debugger");
        assert_ne!(a, b);
        assert!(a.starts_with("debugger_"));
        assert_eq!(a.split('_').count(), 3);
    }
}
