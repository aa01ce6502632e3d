//! TTL cache over a pluggable store
//!
//! Provides a `TtlCache` that stores serializable data as JSON together with the
//! unix-millisecond timestamp of the write. Reads past the TTL evict the entry.

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, error};

use super::store::CacheStore;

/// Wrapper struct for cached data stored in the backing medium
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached, in unix milliseconds
    timestamp: i64,
}

/// TTL classes used by the dashboard datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTtl {
    /// User analytics, mint editions and other full sweeps (12 hours)
    Analytics,
    /// Per-chain transaction metrics (15 minutes)
    TransactionStats,
}

impl CacheTtl {
    pub fn duration(self) -> Duration {
        match self {
            CacheTtl::Analytics => Duration::hours(12),
            CacheTtl::TransactionStats => Duration::minutes(15),
        }
    }
}

/// Key/value cache with a fixed time-to-live
///
/// There is no size bound and no LRU: the only eviction is read-time expiry and
/// explicit [`clear`](Self::clear). All storage failures are logged and swallowed;
/// a failed read is reported as a miss and a failed write as a no-op.
#[derive(Debug)]
pub struct TtlCache<S> {
    store: S,
    ttl: Duration,
}

impl<S: CacheStore> TtlCache<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Creates a cache using one of the predefined TTL classes
    pub fn with_class(store: S, class: CacheTtl) -> Self {
        Self::new(store, class.duration())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads a value, treating entries older than the TTL as absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, Utc::now())
    }

    /// Reads a value as of `now`
    ///
    /// An entry is expired when `now - timestamp > ttl`; expired entries are
    /// removed from the store before returning `None`.
    pub fn get_at<T: DeserializeOwned>(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let raw = match self.store.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                error!(key, error = %e, "Error reading from cache");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!(key, error = %e, "Error reading from cache");
                return None;
            }
        };

        let age_ms = now.timestamp_millis() - entry.timestamp;
        if age_ms > self.ttl.num_milliseconds() {
            debug!(key, age_ms, "Cache entry expired");
            self.clear(key);
            return None;
        }

        Some(entry.data)
    }

    /// Stores a value stamped with the current time
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        self.set_at(key, data, Utc::now())
    }

    /// Stores a value stamped with `now`
    pub fn set_at<T: Serialize>(&self, key: &str, data: &T, now: DateTime<Utc>) {
        let entry = CacheEntry {
            data,
            timestamp: now.timestamp_millis(),
        };

        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                error!(key, error = %e, "Error writing to cache");
                return;
            }
        };

        if let Err(e) = self.store.write(key, &json) {
            error!(key, error = %e, "Error writing to cache");
        }
    }

    /// Removes an entry unconditionally
    pub fn clear(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            error!(key, error = %e, "Error clearing cache");
        }
    }
}
