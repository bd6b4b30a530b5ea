//! Bounded LRU cache for loadkit
//!
//! This crate provides a fixed-capacity cache with least-recently-used
//! eviction, used directly for memoization and as the backing store of the
//! component cache.
//!
//! # Features
//!
//! - **LRU Eviction**: the least recently used entry is evicted when a new key arrives at capacity
//! - **Non-mutating probes**: `has` and `peek` never change eviction order
//! - **Disposal Hook**: an optional callback receives every evicted, replaced, deleted or cleared entry
//! - **Statistics**: hits, misses, inserts, replacements, evictions and disposals
//!
//! # Example
//!
//! ```
//! use loadkit_cache::LruCache;
//!
//! let mut cache = LruCache::new(2)?;
//! cache.set("squat", 0.92);
//! cache.set("lunge", 0.81);
//! cache.get(&"squat");
//! cache.set("plank", 0.77);
//!
//! assert!(cache.has(&"squat"));
//! assert!(!cache.has(&"lunge"));
//! # Ok::<(), loadkit_core::LoadkitError>(())
//! ```

pub mod cache;
pub mod config;
pub mod stats;

pub use cache::{Disposer, LruCache};
pub use config::CacheConfig;
pub use stats::CacheStats;
