//! Component Cache Example
//!
//! Demonstrates deduplicated preloading and deferred component handles.

use anyhow::Result;
use loadkit_components::{ComponentCache, ComponentCacheConfig};
use loadkit_core::loader;
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Screen {
    name: &'static str,
}

fn screen(name: &'static str) -> loadkit_core::BoxLoader<Screen> {
    loader(move || async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        Ok(Screen { name })
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    loadkit_demos::init_logging();
    println!("=== Component Cache Example ===\n");

    let cache = ComponentCache::new(ComponentCacheConfig::default().with_capacity(3))?;

    // Example 1: Preload
    println!("--- Example 1: Preload ---\n");
    for attempt in 1..=2 {
        let start = Instant::now();
        let home = cache.preload_component(screen("home"), Some("home")).await?;
        println!(
            "Attempt {}: {} ready in {:?}",
            attempt,
            home.name,
            start.elapsed()
        );
    }

    // Example 2: Lazy handles
    println!("\n--- Example 2: Lazy Components ---\n");
    let history = cache.create_lazy_component(screen("history"), Some("history"));
    println!("history resolved before use: {}", history.is_resolved());
    let resolved = history.resolve().await?;
    println!("history resolved to {:?}", resolved);

    let again = cache.create_lazy_component(screen("history"), Some("history"));
    println!("second handle resolved up front: {}", again.is_resolved());

    // Example 3: Failure and stats
    println!("\n--- Example 3: Failures and Stats ---\n");
    let broken = loader(|| async { Err::<Screen, _>("bundle checksum mismatch".into()) });
    if let Err(e) = cache.preload_component(broken, Some("settings")).await {
        println!("Preload failed: {}", e);
    }

    let stats = cache.get_cache_stats();
    println!("Cached: {} {:?}", stats.size, stats.keys);
    println!("Estimated memory: {} bytes", stats.memory_usage);

    println!("Cleared {} components", cache.clear_component_cache(None));

    println!("\n=== All component cache examples completed! ===");
    Ok(())
}
