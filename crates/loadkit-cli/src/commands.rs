use crate::app::{App, ComponentHandle};
use crate::config::Config;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use loadkit_cache::LruCache;
use loadkit_core::{loader, BoxLoader};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One step of a cache access trace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Set(String),
    Get(String),
    Has(String),
    Delete(String),
}

impl CacheOp {
    /// Parse `set:key`, `get:key`, `has:key`, `del:key`, or a bare `key` (set)
    pub fn parse(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let (op, key) = match spec.split_once(':') {
            Some((op, key)) => (op, key),
            None => ("set", spec),
        };
        if key.is_empty() {
            bail!("Empty key in cache op '{}'", spec);
        }
        let key = key.to_string();
        match op {
            "set" => Ok(CacheOp::Set(key)),
            "get" => Ok(CacheOp::Get(key)),
            "has" => Ok(CacheOp::Has(key)),
            "del" | "delete" => Ok(CacheOp::Delete(key)),
            other => bail!("Unknown cache op '{}' (expected set, get, has or del)", other),
        }
    }
}

/// A simulated resource for the queue command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItemSpec {
    pub id: String,
    pub priority: i32,
    pub fail: bool,
}

impl QueueItemSpec {
    /// Parse `id`, `id:priority` or `id:priority:fail`
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.trim().split(':');
        let id = parts.next().unwrap_or_default().to_string();
        if id.is_empty() {
            bail!("Empty resource id in '{}'", spec);
        }
        let priority = match parts.next() {
            Some(p) => p
                .parse::<i32>()
                .with_context(|| format!("Invalid priority in '{}'", spec))?,
            None => 0,
        };
        let fail = match parts.next() {
            Some("fail") => true,
            Some(other) => bail!("Unknown flag '{}' in '{}' (expected 'fail')", other, spec),
            None => false,
        };
        Ok(Self { id, priority, fail })
    }
}

pub fn run_cache_trace(config: &Config, ops: &[String]) -> Result<()> {
    let ops = ops
        .iter()
        .map(|s| CacheOp::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let evicted = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&evicted);
    let mut cache: LruCache<String, usize> = LruCache::with_config(config.cache_config())?;
    cache.set_disposer(move |key, _| sink.lock().push(key));

    println!(
        "{} Replaying {} ops with capacity {}",
        "→".bright_blue(),
        ops.len(),
        cache.capacity()
    );

    for (step, op) in ops.iter().enumerate() {
        let outcome = match op {
            CacheOp::Set(key) => {
                cache.set(key.clone(), step);
                format!("set {}", key)
            }
            CacheOp::Get(key) => match cache.get(key.as_str()) {
                Some(value) => format!("get {} -> {}", key, value),
                None => format!("get {} -> {}", key, "miss".bright_red()),
            },
            CacheOp::Has(key) => format!("has {} -> {}", key, cache.has(key.as_str())),
            CacheOp::Delete(key) => format!("del {} -> {}", key, cache.delete(key.as_str())),
        };
        println!("  {:>3}. {}", step + 1, outcome);
    }

    let order: Vec<String> = cache.keys().collect();
    let stats = cache.stats();
    println!();
    println!(
        "{} {}",
        "Recency (LRU → MRU):".bright_yellow(),
        order.join(", ")
    );
    let evicted = evicted.lock();
    if !evicted.is_empty() {
        println!("{} {}", "Removed:".bright_yellow(), evicted.join(", "));
    }
    println!(
        "{} hits={} misses={} evictions={} hit_rate={:.2}",
        "Stats:".bright_yellow(),
        stats.hits(),
        stats.misses(),
        stats.evictions(),
        stats.hit_rate()
    );

    Ok(())
}

pub async fn run_queue(app: &App, items: &[String], load_ms: u64) -> Result<()> {
    let items = items
        .iter()
        .map(|s| QueueItemSpec::parse(s))
        .collect::<Result<Vec<_>>>()?;

    let drained = Arc::new(Mutex::new(Vec::new()));
    let start = Instant::now();

    println!(
        "{} Queueing {} resources ({}ms between loads)",
        "→".bright_blue(),
        items.len(),
        app.config.queue.inter_item_delay_ms
    );
    for item in items {
        let load = simulated_loader(&item, Duration::from_millis(load_ms), &drained);
        app.queue.add_resource(item.id.clone(), load, item.priority);
    }

    app.queue.wait_idle().await;

    let metrics = app.queue.metrics().snapshot();
    let order = drained.lock().clone();
    println!("{} {}", "Drain order:".bright_yellow(), order.join(" → "));
    println!(
        "{} loaded={} failed={} in {:.2}ms",
        "✓".bright_green(),
        metrics.loaded,
        metrics.failed,
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(())
}

fn simulated_loader(
    item: &QueueItemSpec,
    delay: Duration,
    drained: &Arc<Mutex<Vec<String>>>,
) -> BoxLoader<()> {
    let id = item.id.clone();
    let fail = item.fail;
    let drained = Arc::clone(drained);
    loader(move || async move {
        tokio::time::sleep(delay).await;
        drained.lock().push(id.clone());
        if fail {
            Err(format!("simulated failure loading '{}'", id).into())
        } else {
            Ok(())
        }
    })
}

pub async fn run_components(app: &App, keys: &[String], load_ms: u64) -> Result<()> {
    let delay = Duration::from_millis(load_ms);

    // Second pass should be served entirely from the cache
    for pass in 1..=2 {
        let start = Instant::now();
        for key in keys {
            let name = key.clone();
            let load = loader(move || async move {
                let started = Instant::now();
                tokio::time::sleep(delay).await;
                Ok(ComponentHandle {
                    name,
                    load_time: started.elapsed(),
                })
            });
            let handle = app.components.preload_component(load, Some(key)).await?;
            tracing::debug!(component = %key, load_time = ?handle.load_time, "Component ready");
        }
        println!(
            "{} Pass {}: {} components in {:.2}ms",
            "✓".bright_green(),
            pass,
            keys.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let stats = app.components.get_cache_stats();
    println!(
        "{} size={} memory≈{} bytes",
        "Component cache:".bright_yellow(),
        stats.size,
        stats.memory_usage
    );
    println!("  keys: {}", stats.keys.join(", "));

    Ok(())
}

pub fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Refusing to overwrite existing file: {:?}", path);
    }
    Config::default().save(path)?;
    println!("{} Wrote default configuration to {:?}", "✓".bright_green(), path);
    Ok(())
}
