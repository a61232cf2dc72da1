//! Expiring session cache
//!
//! Stores admitted payment sessions keyed by their numeric handle, each
//! entry carrying an absolute expiry time. Expiry is enforced on every read:
//! an entry past its deadline behaves exactly like one that was never
//! stored, whether or not it has been physically evicted yet. A periodic
//! `prune` keeps abandoned sessions from accumulating.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Whether a deadline has passed. Shared by the cache and by the session
/// manager's admission and resolution checks so the two can never diverge.
pub fn is_expired(deadline_ms: i64, now_ms: i64) -> bool {
    now_ms > deadline_ms
}

// ============================================================================
// Cache Implementation
// ============================================================================

/// An expiring cache with per-entry absolute deadlines.
pub struct ExpiringCache<V> {
    entries: RwLock<HashMap<u64, CacheEntry<V>>>,
    stats: CacheStats,
}

struct CacheEntry<V> {
    value: V,
    expires_at_ms: i64,
}

/// Cache statistics
#[derive(Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn expirations(&self) -> u64 {
        self.expirations.load(Ordering::Relaxed)
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::default(),
        }
    }

    /// Store a value under `key`, overwriting any existing entry.
    ///
    /// `ttl_seconds` may be zero or negative; the entry is then stored
    /// already expired. This is a legitimate state when the inbound deadline
    /// has already nearly passed, and `put` never fails because of it.
    pub async fn put(&self, key: u64, value: V, ttl_seconds: i64) {
        let expires_at_ms = now_ms() + ttl_seconds.saturating_mul(1000);
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at_ms,
            },
        );
    }

    /// Fetch the value under `key` iff it has not expired.
    ///
    /// An expired entry is lazily evicted and reported as a miss.
    pub async fn get(&self, key: u64) -> Option<V> {
        let now = now_ms();
        let mut entries = self.entries.write().await;

        match entries.get(&key) {
            Some(entry) if is_expired(entry.expires_at_ms, now) => {
                entries.remove(&key);
                self.stats.expirations.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value.clone())
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Remove and return the value under `key` iff it has not expired.
    ///
    /// Same visibility rule as [`get`](Self::get); the removal lets callers
    /// release the cache before doing slow work with the value.
    pub async fn take(&self, key: u64) -> Option<V> {
        let now = now_ms();
        let mut entries = self.entries.write().await;

        match entries.remove(&key) {
            Some(entry) if is_expired(entry.expires_at_ms, now) => {
                self.stats.expirations.fetch_add(1, Ordering::Relaxed);
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some(entry) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value)
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Evict every expired entry, returning how many were removed.
    pub async fn prune(&self) -> usize {
        let now = now_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| !is_expired(e.expires_at_ms, now));
        let removed = before - entries.len();
        self.stats
            .expirations
            .fetch_add(removed as u64, Ordering::Relaxed);
        removed
    }

    /// Number of physically stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Whether `key` is physically stored, regardless of expiry.
    pub(crate) async fn contains_raw(&self, key: u64) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(&key)
    }
}

// ============================================================================
// Tests
// ============================================================================
