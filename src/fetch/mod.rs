//! Paginated fetcher and cache-backed loading
//!
//! [`fetch_all`] sweeps a paged endpoint one page at a time until the backend
//! reports no next page. [`load_cached`] wraps any fetch in the TTL cache: fresh
//! entries short-circuit the fetch, successful fetches are stored, and a failed
//! fetch falls back to a cached value when one exists.

pub mod generation;

pub use generation::{RequestToken, RequestTracker};

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tracing::{info, warn};

use crate::cache::{CacheStore, TtlCache};
use crate::data::{FetchError, Filters, PageEnvelope};

/// Safety ceiling on pages fetched in one sweep
pub const MAX_PAGES: u32 = 1000;

/// Something that can return one page of a paged collection
pub trait PageSource<T> {
    fn fetch_page(
        &self,
        page: u32,
        limit: u32,
        filters: &Filters,
    ) -> impl Future<Output = Result<PageEnvelope<T>, FetchError>> + Send;
}

/// Fetches every page of `source` and returns the items in page order
///
/// Starts at page 1 and follows `next_page` until it is `None`. Stops after
/// [`MAX_PAGES`] pages even if the backend keeps reporting more. Any page error
/// aborts the sweep and the items gathered so far are dropped.
pub async fn fetch_all<T, P>(source: &P, limit: u32, filters: &Filters) -> Result<Vec<T>, FetchError>
where
    P: PageSource<T> + Sync,
{
    let mut items = Vec::new();
    let mut page = 1;
    let mut fetched = 0;

    loop {
        let envelope = source.fetch_page(page, limit, filters).await?;
        fetched += 1;
        items.extend(envelope.items);

        let Some(next) = envelope.next_page else {
            break;
        };
        if fetched >= MAX_PAGES {
            warn!(
                pages = fetched,
                "Reached maximum page limit ({}) - stopping pagination", MAX_PAGES
            );
            break;
        }
        page = next;
    }

    info!(pages = fetched, items = items.len(), "Pagination sweep complete");
    Ok(items)
}

/// Where a loaded value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Fresh cache entry, no request made
    Cache,
    /// Fetched from the backend just now
    Backend,
    /// Backend failed; served from a cached entry instead
    Fallback,
}

/// A loaded value and its origin
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub data: T,
    pub origin: Origin,
}

impl<T> Loaded<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Loaded<U> {
        Loaded {
            data: f(self.data),
            origin: self.origin,
        }
    }
}

/// Whether a fresh cache entry may satisfy a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Serve a fresh cache entry without contacting the backend
    #[default]
    PreferCache,
    /// Always fetch; the cache is only used as a fallback on failure
    Refresh,
}

/// Loads `key` from the cache, or runs `fetch` and caches its result
///
/// A fetch error is returned only when the cache holds no usable entry for `key`;
/// otherwise the cached value is served and the error is logged.
pub async fn load_cached<T, S, F, Fut>(
    cache: &TtlCache<S>,
    key: &str,
    policy: CachePolicy,
    fetch: F,
) -> Result<Loaded<T>, FetchError>
where
    T: Serialize + DeserializeOwned,
    S: CacheStore,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    if policy == CachePolicy::PreferCache {
        if let Some(data) = cache.get::<T>(key) {
            return Ok(Loaded {
                data,
                origin: Origin::Cache,
            });
        }
    }

    match fetch().await {
        Ok(data) => {
            cache.set(key, &data);
            Ok(Loaded {
                data,
                origin: Origin::Backend,
            })
        }
        Err(e) => match cache.get::<T>(key) {
            Some(data) => {
                warn!(key, error = %e, "Fetch failed, using cached data");
                Ok(Loaded {
                    data,
                    origin: Origin::Fallback,
                })
            }
            None => Err(e),
        },
    }
}

/// Sweeps `source` through the cache under `key`
pub async fn load_all_cached<T, P, S>(
    cache: &TtlCache<S>,
    key: &str,
    policy: CachePolicy,
    source: &P,
    limit: u32,
    filters: &Filters,
) -> Result<Loaded<Vec<T>>, FetchError>
where
    T: Serialize + DeserializeOwned,
    P: PageSource<T> + Sync,
    S: CacheStore,
{
    load_cached(cache, key, policy, || fetch_all(source, limit, filters)).await
}
