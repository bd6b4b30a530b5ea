//! Component Cache
//!
//! Deduplicates loads of named component handles. Loaded handles are kept in
//! a bounded [`LruCache`] so a long session cannot grow the cache without
//! limit; handles pushed out go through the optional disposal hook.

use crate::config::ComponentCacheConfig;
use crate::lazy::LazyComponent;
use loadkit_cache::{CacheStats, LruCache};
use loadkit_core::{BoxLoader, LoadkitError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Snapshot returned by [`ComponentCache::get_cache_stats`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentCacheStats {
    /// Number of cached handles
    pub size: usize,
    /// Cached keys, least recently used first
    pub keys: Vec<String>,
    /// Rough estimate in bytes (`size * estimated_entry_bytes`), not a measurement
    pub memory_usage: usize,
}

/// Shared cache of loaded component handles keyed by name
///
/// Cloning yields another handle to the same underlying cache.
pub struct ComponentCache<T> {
    entries: Arc<Mutex<LruCache<String, Arc<T>>>>,
    config: ComponentCacheConfig,
}

impl<T> Clone for ComponentCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            config: self.config.clone(),
        }
    }
}

impl<T: Send + Sync + 'static> ComponentCache<T> {
    /// Create a component cache with the given configuration
    pub fn new(config: ComponentCacheConfig) -> Result<Self> {
        let entries = LruCache::new(config.capacity)?;
        Ok(Self {
            entries: Arc::new(Mutex::new(entries)),
            config,
        })
    }

    /// Create a component cache with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(ComponentCacheConfig::default())
    }

    /// Create a component cache whose evicted or removed handles are passed
    /// to `disposer` (e.g. to unmount them)
    pub fn with_disposer<F>(config: ComponentCacheConfig, disposer: F) -> Result<Self>
    where
        F: FnMut(String, Arc<T>) + Send + 'static,
    {
        let cache = Self::new(config)?;
        cache.entries.lock().set_disposer(disposer);
        Ok(cache)
    }

    /// Build a deferred handle for a component
    ///
    /// If `cache_key` is already cached the handle is resolved up front and
    /// `loader` is never invoked. Otherwise the loader runs on the first
    /// [`LazyComponent::resolve`] and its result is cached under `cache_key`.
    pub fn create_lazy_component(
        &self,
        loader: BoxLoader<T>,
        cache_key: Option<&str>,
    ) -> LazyComponent<T> {
        if let Some(key) = cache_key {
            if let Some(component) = self.get(key) {
                debug!(component = key, "Lazy component served from cache");
                return LazyComponent::resolved(key.to_string(), component, self.clone());
            }
        }

        LazyComponent::deferred(cache_key.map(str::to_string), loader, self.clone())
    }

    /// Load and cache a component ahead of time
    ///
    /// An already cached key resolves immediately without calling `loader`.
    /// Loader failures are returned to the caller and leave the cache as it was.
    pub async fn preload_component(
        &self,
        loader: BoxLoader<T>,
        cache_key: Option<&str>,
    ) -> Result<Arc<T>> {
        if let Some(key) = cache_key {
            if let Some(component) = self.get(key) {
                debug!(component = key, "Preload skipped, component already cached");
                return Ok(component);
            }
        }

        let component = self.load(cache_key, loader).await?;
        info!(component = cache_key.unwrap_or("<uncached>"), "Preloaded component");
        Ok(component)
    }

    /// Remove one cached component, or all of them when `cache_key` is `None`
    ///
    /// Returns the number of handles removed.
    pub fn clear_component_cache(&self, cache_key: Option<&str>) -> usize {
        let mut entries = self.entries.lock();
        match cache_key {
            Some(key) => usize::from(entries.delete(key)),
            None => {
                let removed = entries.size();
                entries.clear();
                removed
            }
        }
    }

    /// Size, keys and estimated memory usage of the cache
    pub fn get_cache_stats(&self) -> ComponentCacheStats {
        let entries = self.entries.lock();
        let size = entries.size();
        ComponentCacheStats {
            size,
            keys: entries.keys().collect(),
            memory_usage: size * self.config.estimated_entry_bytes,
        }
    }

    /// Look up a cached handle, marking it as recently used
    pub fn get(&self, cache_key: &str) -> Option<Arc<T>> {
        self.entries.lock().get(cache_key).cloned()
    }

    /// Check for a cached handle without affecting eviction order
    pub fn contains(&self, cache_key: &str) -> bool {
        self.entries.lock().has(cache_key)
    }

    /// Hit/miss/eviction counters of the underlying LRU cache
    pub fn lookup_stats(&self) -> Arc<CacheStats> {
        self.entries.lock().stats()
    }

    /// Get the cache configuration
    pub fn config(&self) -> &ComponentCacheConfig {
        &self.config
    }

    /// Run a loader and cache its result under `cache_key`, if given
    pub(crate) async fn load(
        &self,
        cache_key: Option<&str>,
        loader: BoxLoader<T>,
    ) -> Result<Arc<T>> {
        let id = cache_key.unwrap_or("<uncached>");
        let component = match loader().await {
            Ok(component) => Arc::new(component),
            Err(e) => {
                warn!(component = id, "Component load failed: {}", e);
                return Err(LoadkitError::loader_failed(id, e));
            }
        };

        if let Some(key) = cache_key {
            self.entries
                .lock()
                .set(key.to_string(), Arc::clone(&component));
        }
        Ok(component)
    }
}

impl<T> std::fmt::Debug for ComponentCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentCache")
            .field("capacity", &self.config.capacity)
            .field("estimated_entry_bytes", &self.config.estimated_entry_bytes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadkit_core::loader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Screen(&'static str);

    fn counting_loader(calls: &Arc<AtomicUsize>, name: &'static str) -> BoxLoader<Screen> {
        let calls = Arc::clone(calls);
        loader(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Screen(name))
        })
    }

    fn failing_loader() -> BoxLoader<Screen> {
        loader(|| async { Err("chunk failed to load".into()) })
    }

    fn cache() -> ComponentCache<Screen> {
        ComponentCache::with_defaults().unwrap()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result =
            ComponentCache::<Screen>::new(ComponentCacheConfig::default().with_capacity(0));
        assert!(matches!(result, Err(LoadkitError::InvalidCapacity(0))));
    }

    #[tokio::test]
    async fn test_preload_is_idempotent() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .preload_component(counting_loader(&calls, "history"), Some("history"))
            .await
            .unwrap();
        let second = cache
            .preload_component(counting_loader(&calls, "history"), Some("history"))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_preload_failure_propagates() {
        let cache = cache();

        let err = cache
            .preload_component(failing_loader(), Some("camera"))
            .await
            .unwrap_err();

        assert!(err.is_loader_failure());
        assert!(!cache.contains("camera"));
        assert_eq!(cache.get_cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_preload_without_key_is_not_cached() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .preload_component(counting_loader(&calls, "modal"), None)
            .await
            .unwrap();
        cache
            .preload_component(counting_loader(&calls, "modal"), None)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get_cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_lazy_component_uses_cached_value() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .preload_component(counting_loader(&calls, "results"), Some("results"))
            .await
            .unwrap();

        let lazy = cache.create_lazy_component(counting_loader(&calls, "results"), Some("results"));
        assert!(lazy.is_resolved());

        let component = lazy.resolve().await.unwrap();
        assert_eq!(*component, Screen("results"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lazy_component_defers_loading() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let lazy = cache.create_lazy_component(counting_loader(&calls, "record"), Some("record"));
        assert!(!lazy.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!cache.contains("record"));

        lazy.resolve().await.unwrap();
        lazy.resolve().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.contains("record"));
    }

    #[tokio::test]
    async fn test_lazy_component_failure_propagates() {
        let cache = cache();

        let lazy = cache.create_lazy_component(failing_loader(), Some("settings"));
        let err = lazy.resolve().await.unwrap_err();

        assert!(err.is_loader_failure());
        assert!(!cache.contains("settings"));
    }

    #[tokio::test]
    async fn test_clear_single_and_all() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        for name in ["home", "profile", "feedback"] {
            cache
                .preload_component(counting_loader(&calls, name), Some(name))
                .await
                .unwrap();
        }

        assert_eq!(cache.clear_component_cache(Some("profile")), 1);
        assert_eq!(cache.clear_component_cache(Some("profile")), 0);
        assert_eq!(cache.get_cache_stats().keys, vec!["home", "feedback"]);

        assert_eq!(cache.clear_component_cache(None), 2);
        assert_eq!(cache.get_cache_stats().size, 0);
    }

    #[tokio::test]
    async fn test_cache_stats_estimate() {
        let cache = ComponentCache::new(
            ComponentCacheConfig::default().with_estimated_entry_bytes(512),
        )
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        cache
            .preload_component(counting_loader(&calls, "a"), Some("a"))
            .await
            .unwrap();
        cache
            .preload_component(counting_loader(&calls, "b"), Some("b"))
            .await
            .unwrap();

        let stats = cache.get_cache_stats();
        assert_eq!(
            stats,
            ComponentCacheStats {
                size: 2,
                keys: vec!["a".to_string(), "b".to_string()],
                memory_usage: 1024,
            }
        );
    }

    #[tokio::test]
    async fn test_bounded_with_disposer() {
        let unmounted = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&unmounted);
        let cache = ComponentCache::with_disposer(
            ComponentCacheConfig::default().with_capacity(2),
            move |key, _component: Arc<Screen>| sink.lock().push(key),
        )
        .unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        for name in ["a", "b", "c"] {
            cache
                .preload_component(counting_loader(&calls, name), Some(name))
                .await
                .unwrap();
        }

        assert_eq!(cache.get_cache_stats().size, 2);
        assert!(!cache.contains("a"));
        assert_eq!(*unmounted.lock(), vec!["a".to_string()]);
    }
}
