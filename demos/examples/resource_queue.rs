//! Resource Queue Example
//!
//! Demonstrates priority-ordered background loading, failure isolation and
//! cancelling pending work.

use anyhow::Result;
use loadkit_core::loader;
use loadkit_queue::{QueueConfig, ResourceQueue};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    loadkit_demos::init_logging();
    println!("=== Resource Queue Example ===\n");

    // Example 1: Priority ordering
    priority_ordering().await?;

    // Example 2: Cancelling pending loads
    clear_pending().await?;

    println!("\n=== All resource queue examples completed! ===");
    Ok(())
}

fn simulated(name: &'static str, ms: u64, fail: bool) -> loadkit_core::BoxLoader<&'static str> {
    loader(move || async move {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        if fail {
            Err(format!("{} is unavailable", name).into())
        } else {
            Ok(name)
        }
    })
}

/// Example 1: Higher priorities drain first; a failure does not stop the queue
async fn priority_ordering() -> Result<()> {
    println!("--- Example 1: Priority Ordering ---\n");

    let queue = ResourceQueue::new(
        QueueConfig::default().with_inter_item_delay(Duration::from_millis(10)),
    );

    // The first item starts right away; the rest are reordered by priority
    queue.add_resource("intro-video", simulated("intro-video", 20, false), 0);
    queue.add_resource("exercise-thumbnails", simulated("exercise-thumbnails", 20, false), 1);
    queue.add_resource("pose-model", simulated("pose-model", 20, false), 10);
    queue.add_resource("legacy-sounds", simulated("legacy-sounds", 20, true), 5);

    println!("Status after enqueue: {:?}", queue.get_queue_status());
    queue.wait_idle().await;

    let metrics = queue.metrics().snapshot();
    println!("Loaded: {}  Failed: {}", metrics.loaded, metrics.failed);

    Ok(())
}

/// Example 2: clear_queue drops work that has not started yet
async fn clear_pending() -> Result<()> {
    println!("\n--- Example 2: Clear Pending ---\n");

    let queue = ResourceQueue::new(QueueConfig::without_delay());
    for i in 0..5 {
        queue.add_resource(format!("chunk-{}", i), simulated("chunk", 50, false), i);
    }

    let discarded = queue.clear_queue();
    println!("Discarded {} pending loads", discarded);

    queue.wait_idle().await;
    println!("Final status: {:?}", queue.get_queue_status());
    println!("Metrics: {:?}", queue.metrics().snapshot());

    Ok(())
}
