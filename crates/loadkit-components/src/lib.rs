//! Component cache for loadkit
//!
//! Avoids loading the same named component handle twice. Handles are
//! resolved through caller-supplied async loaders and kept in a bounded LRU
//! cache shared by every clone of [`ComponentCache`].
//!
//! Unlike the resource queue, loader failures here are returned to the
//! caller of [`ComponentCache::preload_component`] or
//! [`LazyComponent::resolve`]; the shared cache is left untouched.
//!
//! # Example
//!
//! ```
//! use loadkit_components::{ComponentCache, ComponentCacheConfig};
//! use loadkit_core::loader;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> loadkit_core::Result<()> {
//! let cache: ComponentCache<String> = ComponentCache::new(ComponentCacheConfig::default())?;
//!
//! let lazy = cache.create_lazy_component(
//!     loader(|| async { Ok("ExerciseDetailScreen".to_string()) }),
//!     Some("exercise-detail"),
//! );
//! let screen = lazy.resolve().await?;
//!
//! assert_eq!(screen.as_str(), "ExerciseDetailScreen");
//! assert_eq!(cache.get_cache_stats().keys, vec!["exercise-detail"]);
//! # Ok(())
//! # }
//! ```

pub mod component_cache;
pub mod config;
pub mod lazy;

pub use component_cache::{ComponentCache, ComponentCacheStats};
pub use config::ComponentCacheConfig;
pub use lazy::LazyComponent;
