//! LRU Cache Example
//!
//! Demonstrates recency-ordered eviction, disposal hooks and statistics.

use anyhow::Result;
use loadkit_cache::{CacheConfig, LruCache};
use parking_lot::Mutex;
use std::sync::Arc;

fn main() -> Result<()> {
    loadkit_demos::init_logging();
    println!("=== LRU Cache Example ===\n");

    // Example 1: Recency and eviction
    recency_and_eviction()?;

    // Example 2: Disposal hook
    disposal_hook()?;

    // Example 3: Statistics
    cache_statistics()?;

    println!("\n=== All LRU cache examples completed! ===");
    Ok(())
}

/// Example 1: Reads refresh recency, inserts past capacity evict the oldest key
fn recency_and_eviction() -> Result<()> {
    println!("--- Example 1: Recency and Eviction ---\n");

    let mut cache = LruCache::new(3)?;
    cache.set("squat", 1);
    cache.set("lunge", 2);
    cache.set("plank", 3);
    println!("Inserted squat, lunge, plank (capacity 3)");

    // Touch the oldest entry so it survives the next insert
    let _ = cache.get("squat");
    cache.set("burpee", 4);

    println!("After get(squat) and set(burpee):");
    println!("  has(lunge) = {}", cache.has("lunge"));
    println!(
        "  order (LRU → MRU) = {:?}",
        cache.keys().collect::<Vec<_>>()
    );

    Ok(())
}

/// Example 2: Values leaving the cache are handed to a disposer
fn disposal_hook() -> Result<()> {
    println!("\n--- Example 2: Disposal Hook ---\n");

    let released = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&released);
    let mut cache = LruCache::with_disposer(2, move |key: String, _texture: Vec<u8>| {
        sink.lock().push(key);
    })?;

    cache.set("avatar".to_string(), vec![0u8; 16]);
    cache.set("badge".to_string(), vec![0u8; 16]);
    cache.set("banner".to_string(), vec![0u8; 16]);
    cache.delete("badge");

    println!("Released textures: {:?}", *released.lock());
    println!("Remaining: {:?}", cache.keys().collect::<Vec<_>>());

    Ok(())
}

/// Example 3: Hit, miss and eviction counters
fn cache_statistics() -> Result<()> {
    println!("\n--- Example 3: Cache Statistics ---\n");

    let mut cache = LruCache::with_config(CacheConfig::new(5))?;
    for i in 0..8 {
        cache.set(i, i * i);
    }
    for i in 0..10 {
        let _ = cache.get(&i);
    }

    let stats = cache.stats();
    println!("Cache Statistics:");
    println!("  Hits:      {}", stats.hits());
    println!("  Misses:    {}", stats.misses());
    println!("  Hit Rate:  {:.1}%", stats.hit_rate() * 100.0);
    println!("  Evictions: {}", stats.evictions());
    println!("  Entries:   {}", stats.entry_count());

    cache.clear();
    println!("\nCache cleared! Entries: {}", cache.size());

    Ok(())
}
