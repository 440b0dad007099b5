use crate::error::Result;
use crate::metrics::CATALOG_CACHE_LOOKUPS_TOTAL;
use moka::future::Cache;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// How a cached lookup was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CacheLookup {
    /// Served from cache without a request
    Fresh,
    /// Cached value was past its freshness window and got refetched
    Stale,
    /// Nothing cached
    Miss,
}

#[derive(Clone)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// Query cache with a freshness window and an idle retention period.
///
/// Entries younger than `stale_time` are served as-is. Older entries trigger
/// a refetch; if that refetch fails the old value is still returned. Entries
/// nobody reads for `retention` are evicted.
#[derive(Clone)]
pub struct QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: Cache<K, Entry<V>>,
    stale_time: Duration,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Clone + std::fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(max_capacity: u64, stale_time: Duration, retention: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_idle(retention)
            .build();

        Self { cache, stale_time }
    }

    /// Return the cached value if it is still fresh
    pub async fn get_fresh(&self, key: &K) -> Option<V> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| entry.value)
    }

    /// Serve `key` from cache, fetching it when missing or stale
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cached = self.cache.get(&key).await;

        let lookup = match &cached {
            Some(entry) if entry.fetched_at.elapsed() < self.stale_time => CacheLookup::Fresh,
            Some(_) => CacheLookup::Stale,
            None => CacheLookup::Miss,
        };
        let label: &'static str = lookup.into();
        CATALOG_CACHE_LOOKUPS_TOTAL.with_label_values(&[label]).inc();

        if let Some(entry) = cached.as_ref().filter(|_| lookup == CacheLookup::Fresh) {
            debug!(key = ?key, "Catalog cache hit");
            return Ok(entry.value.clone());
        }

        match fetch().await {
            Ok(value) => {
                self.insert(key, value.clone()).await;
                Ok(value)
            }
            Err(e) => match cached {
                Some(entry) => {
                    warn!(key = ?key, error = %e, "Refetch failed, serving stale entry");
                    Ok(entry.value)
                }
                None => Err(e),
            },
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        self.cache
            .insert(
                key,
                Entry {
                    value,
                    fetched_at: Instant::now(),
                },
            )
            .await;
    }

    pub async fn invalidate(&self, key: &K) {
        self.cache.invalidate(key).await;
    }

    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
