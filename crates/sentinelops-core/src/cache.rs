// crates/sentinelops-core/src/cache.rs
// ============================================================================
// Module: SentinelOps Result Cache
// Description: TTL + LRU bounded cache for idempotent analysis/remediation lookups.
// Purpose: Avoid redundant dependency calls for repeated or retried work.
// Dependencies: crate::interfaces::Clock, std::sync::Mutex
// ============================================================================

//! ## Overview
//! Keyed by an opaque `String` (callers build keys from incident id plus
//! operation), entries expire after a configured TTL and the cache evicts
//! least-recently-used entries once it would exceed `max_entries`. See
//! the Result Cache section of the configuration reference.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::interfaces::Clock;

struct Entry<V> {
    value: V,
    inserted_at_millis: u64,
    last_used_seq: u64,
}

struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    clock_seq: u64,
}

/// A bounded, TTL-expiring, LRU-evicting cache of values of type `V`.
pub struct ResultCache<V> {
    max_entries: usize,
    ttl_millis: u64,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> ResultCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(max_entries: usize, ttl_millis: u64) -> Self {
        Self {
            max_entries: max_entries.max(1),
            ttl_millis,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                clock_seq: 0,
            }),
        }
    }

    /// Returns the cached value for `key` if present and not expired,
    /// bumping its recency.
    #[must_use]
    pub fn get(&self, key: &str, clock: &dyn Clock) -> Option<V> {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        let now = clock.monotonic_millis();
        let expired = guard
            .entries
            .get(key)
            .is_some_and(|entry| now.saturating_sub(entry.inserted_at_millis) > self.ttl_millis);
        if expired {
            guard.entries.remove(key);
            return None;
        }
        guard.clock_seq += 1;
        let seq = guard.clock_seq;
        let value = guard.entries.get_mut(key).map(|entry| {
            entry.last_used_seq = seq;
            entry.value.clone()
        });
        value
    }

    /// Inserts or overwrites `key`, evicting the least-recently-used entry
    /// first if the cache is at capacity.
    pub fn put(&self, key: String, value: V, clock: &dyn Clock) {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        let mut guard = self.inner.lock().unwrap();
        guard.clock_seq += 1;
        let seq = guard.clock_seq;

        if !guard.entries.contains_key(&key) && guard.entries.len() >= self.max_entries {
            if let Some(lru_key) = guard
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used_seq)
                .map(|(k, _)| k.clone())
            {
                guard.entries.remove(&lru_key);
            }
        }

        guard.entries.insert(
            key,
            Entry {
                value,
                inserted_at_millis: clock.monotonic_millis(),
                last_used_seq: seq,
            },
        );
    }

    /// Number of live entries, including not-yet-expired ones.
    #[must_use]
    pub fn len(&self) -> usize {
        #[allow(clippy::unwrap_used, reason = "mutex is never poisoned: no panics occur while held")]
        self.inner.lock().unwrap().entries.len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
