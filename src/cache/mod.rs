//! Cache module for storing backend sweeps between runs
//!
//! This module provides a TTL cache that persists serialized datasets through a
//! pluggable [`CacheStore`]. Entries older than their TTL are evicted on read, and
//! storage failures are logged and treated as a cache miss rather than surfaced.

mod manager;
mod store;

pub use manager::{CacheTtl, TtlCache};
pub use store::{CacheStore, FileStore, MemoryStore};
