use std::{collections::HashMap, sync::Arc, time::Duration};

use color_eyre::Result;
use tokio::{sync::RwLock, time::Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug)]
struct Store<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Bumped by every invalidation.
    generation: u64,
}

/// String-keyed cache where every entry carries its own expiry.
///
/// Clones share the same store, so the copy held by the sweeper task and the
/// copies inside request handlers all see the same entries. Expired entries
/// are never returned, even before the sweeper gets to them.
///
/// A value computed outside the lock can be written with
/// [`TtlCache::insert_if_current`], which drops the write when an
/// invalidation happened after [`TtlCache::generation`] was read.
#[derive(Debug, Clone)]
pub(crate) struct TtlCache<V> {
    store: Arc<RwLock<Store<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub(crate) fn new(default_ttl: Duration) -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                entries: HashMap::new(),
                generation: 0,
            })),
            default_ttl,
        }
    }

    pub(crate) async fn get(&self, key: &str) -> Option<V> {
        {
            let store = self.store.read().await;
            match store.entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired() => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut store = self.store.write().await;
        if store.entries.get(key).is_some_and(CacheEntry::is_expired) {
            store.entries.remove(key);
        }

        store.entries.get(key).map(|entry| entry.value.clone())
    }

    pub(crate) async fn generation(&self) -> u64 {
        self.store.read().await.generation
    }

    /// Stores `value` for the default TTL, but only if nothing was invalidated
    /// since `generation` was read. Returns whether the value was stored.
    pub(crate) async fn insert_if_current(
        &self,
        key: impl Into<String>,
        generation: u64,
        value: V,
    ) -> bool {
        let mut store = self.store.write().await;
        if store.generation != generation {
            return false;
        }

        store
            .entries
            .insert(key.into(), CacheEntry::new(value, self.default_ttl));
        true
    }

    pub(crate) async fn invalidate(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        store.generation += 1;

        store.entries.remove(key).is_some()
    }

    /// Drops every entry whose key starts with `prefix`, returning how many went.
    pub(crate) async fn invalidate_prefix(&self, prefix: &str) -> usize {
        let mut store = self.store.write().await;
        store.generation += 1;

        let before = store.entries.len();
        store.entries.retain(|key, _| !key.starts_with(prefix));

        before - store.entries.len()
    }

    /// Removes expired entries and returns how many were dropped.
    pub(crate) async fn sweep(&self) -> usize {
        let mut store = self.store.write().await;
        let before = store.entries.len();
        store.entries.retain(|_, entry| !entry.is_expired());

        before - store.entries.len()
    }

    /// Number of stored entries, expired ones included until the next sweep.
    pub(crate) async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }

    /// Sweeps expired entries every `every` until the task is dropped.
    pub(crate) async fn run_sweeper(self, every: Duration) -> Result<()> {
        tracing::info!(interval_secs = every.as_secs(), "Starting cache sweeper");

        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if self.is_empty().await {
                continue;
            }

            let removed = self.sweep().await;
            if removed > 0 {
                let remaining = self.len().await;
                tracing::debug!(
                    removed,
                    remaining,
                    "Swept expired cache entries"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn put<V: Clone>(cache: &TtlCache<V>, key: &str, value: V) {
        let generation = cache.generation().await;
        assert!(cache.insert_if_current(key, generation, value).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = TtlCache::new(Duration::from_secs(60));
        put(&cache, "recipe_cost:1", 42).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("recipe_cost:1").await, Some(42));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("recipe_cost:1").await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_served() {
        let cache = TtlCache::new(Duration::ZERO);
        put(&cache, "k", "v").await;

        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_only_drops_expired() {
        let cache = TtlCache::new(Duration::from_secs(30));
        put(&cache, "a", 1).await;
        put(&cache, "b", 2).await;

        tokio::time::advance(Duration::from_secs(20)).await;
        put(&cache, "c", 3).await;

        tokio::time::advance(Duration::from_secs(11)).await;

        assert_eq!(cache.sweep().await, 2);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("c").await, Some(3));
    }

    #[tokio::test]
    async fn test_invalidate_and_prefix() {
        let cache = TtlCache::new(Duration::from_secs(300));
        put(&cache, "recipe_cost:1", 1).await;
        put(&cache, "recipe_cost:2", 2).await;
        put(&cache, "units", 3).await;

        assert!(cache.invalidate("recipe_cost:1").await);
        assert!(!cache.invalidate("recipe_cost:1").await);

        assert_eq!(cache.invalidate_prefix("recipe_cost:").await, 1);
        assert_eq!(cache.get("units").await, Some(3));
        assert_eq!(cache.len().await, 1);
        assert!(!cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_stale_fill_after_invalidation_is_dropped() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let filler = cache.clone();

        assert_eq!(filler.get("recipe_cost:1").await, None);
        let generation = filler.generation().await;

        // The price changes while the filler is still computing.
        cache.invalidate("recipe_cost:1").await;

        assert!(!filler.insert_if_current("recipe_cost:1", generation, 384).await);
        assert_eq!(cache.get("recipe_cost:1").await, None);

        let generation = filler.generation().await;
        assert!(filler.insert_if_current("recipe_cost:1", generation, 444).await);
        assert_eq!(cache.get("recipe_cost:1").await, Some(444));
    }

    #[tokio::test]
    async fn test_prefix_invalidation_bumps_generation() {
        let cache: TtlCache<i32> = TtlCache::new(Duration::from_secs(300));
        let generation = cache.generation().await;

        cache.invalidate_prefix("recipe_cost:").await;

        assert!(cache.generation().await > generation);
        assert!(!cache.insert_if_current("recipe_cost:2", generation, 1).await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let cache = TtlCache::new(Duration::from_secs(300));
        let other = cache.clone();

        put(&other, "shared", 7).await;

        assert_eq!(cache.get("shared").await, Some(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache = TtlCache::new(Duration::from_secs(10));
        put(&cache, "gone", 1).await;

        let sweeper = tokio::spawn(cache.clone().run_sweeper(Duration::from_secs(60)));

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len().await, 0);

        sweeper.abort();
    }
}
