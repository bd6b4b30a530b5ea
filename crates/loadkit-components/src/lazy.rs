//! Deferred component handles

use crate::component_cache::ComponentCache;
use loadkit_core::{BoxLoader, LoadkitError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::OnceCell;

struct LazyInner<T> {
    cache_key: Option<String>,
    value: OnceCell<Arc<T>>,
    /// Taken by the first resolution attempt
    loader: Mutex<Option<BoxLoader<T>>>,
    cache: ComponentCache<T>,
}

/// A handle to a component that is loaded on first demand
///
/// Concurrent `resolve` calls share a single load. Once resolved, the value
/// is memoized. A failed load is reported to the caller that triggered it;
/// the loader is spent by then, so later calls fail too and a retry needs a
/// fresh handle from [`ComponentCache::create_lazy_component`].
pub struct LazyComponent<T> {
    inner: Arc<LazyInner<T>>,
}

impl<T> Clone for LazyComponent<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Send + Sync + 'static> LazyComponent<T> {
    pub(crate) fn resolved(cache_key: String, value: Arc<T>, cache: ComponentCache<T>) -> Self {
        Self {
            inner: Arc::new(LazyInner {
                cache_key: Some(cache_key),
                value: OnceCell::new_with(Some(value)),
                loader: Mutex::new(None),
                cache,
            }),
        }
    }

    pub(crate) fn deferred(
        cache_key: Option<String>,
        loader: BoxLoader<T>,
        cache: ComponentCache<T>,
    ) -> Self {
        Self {
            inner: Arc::new(LazyInner {
                cache_key,
                value: OnceCell::new(),
                loader: Mutex::new(Some(loader)),
                cache,
            }),
        }
    }

    /// Resolve the component, loading it if this is the first demand
    pub async fn resolve(&self) -> Result<Arc<T>> {
        let inner = &self.inner;
        inner
            .value
            .get_or_try_init(|| async {
                let id = inner.cache_key.as_deref().unwrap_or("<uncached>");
                let loader = inner.loader.lock().take().ok_or_else(|| {
                    LoadkitError::loader_failed(id, "loader already failed for this handle".into())
                })?;

                inner.cache.load(inner.cache_key.as_deref(), loader).await
            })
            .await
            .cloned()
    }

    /// The value, if already resolved
    pub fn get(&self) -> Option<Arc<T>> {
        self.inner.value.get().cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.inner.value.initialized()
    }

    pub fn cache_key(&self) -> Option<&str> {
        self.inner.cache_key.as_deref()
    }
}

impl<T> std::fmt::Debug for LazyComponent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyComponent")
            .field("cache_key", &self.inner.cache_key)
            .field("resolved", &self.inner.value.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ComponentCacheConfig;
    use loadkit_core::loader;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> ComponentCache<String> {
        ComponentCache::new(ComponentCacheConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_concurrent_resolves_share_one_load() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let lazy = cache.create_lazy_component(
            loader(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::task::yield_now().await;
                Ok("workout-summary".to_string())
            }),
            Some("summary"),
        );

        let other = lazy.clone();
        let (a, b) = tokio::join!(lazy.resolve(), other.resolve());

        assert_eq!(*a.unwrap(), "workout-summary");
        assert_eq!(*b.unwrap(), "workout-summary");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(lazy.get().as_deref().map(String::as_str), Some("workout-summary"));
    }

    #[tokio::test]
    async fn test_failed_handle_stays_failed() {
        let cache = cache();
        let lazy = cache.create_lazy_component(
            loader(|| async { Err("bundle missing".into()) }),
            Some("onboarding"),
        );

        let first = lazy.resolve().await.unwrap_err();
        let second = lazy.resolve().await.unwrap_err();

        assert!(first.to_string().contains("bundle missing"));
        assert!(second.to_string().contains("already failed"));
        assert!(!lazy.is_resolved());

        // Retrying means asking the cache for a new handle
        let retry = cache.create_lazy_component(
            loader(|| async { Ok("welcome".to_string()) }),
            Some("onboarding"),
        );
        assert_eq!(*retry.resolve().await.unwrap(), "welcome");
        assert!(cache.contains("onboarding"));
        assert!(lazy.resolve().await.is_err());
    }

    #[tokio::test]
    async fn test_uncached_lazy_component() {
        let cache = cache();
        let lazy =
            cache.create_lazy_component(loader(|| async { Ok("tooltip".to_string()) }), None);

        assert_eq!(lazy.cache_key(), None);
        assert_eq!(*lazy.resolve().await.unwrap(), "tooltip");
        assert_eq!(cache.get_cache_stats().size, 0);
    }
}
