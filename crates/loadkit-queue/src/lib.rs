//! Sequential resource loading for loadkit
//!
//! [`ResourceQueue`] keeps a priority-ordered backlog of asynchronous loaders
//! and runs them one at a time on a single Tokio task, pausing briefly
//! between items so background loading never floods the runtime.
//!
//! # Failure policy
//!
//! A loader that fails (or panics) is logged and skipped; the rest of the
//! backlog still runs. Nothing is retried; callers that want a retry add the
//! item again.
//!
//! # Example
//!
//! ```
//! use loadkit_core::loader;
//! use loadkit_queue::{QueueConfig, ResourceQueue};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let queue = ResourceQueue::new(QueueConfig::without_delay());
//!
//! queue.add_resource("exercise-catalog", loader(|| async { Ok(()) }), 1);
//! queue.add_resource("pose-model", loader(|| async { Ok(()) }), 5);
//!
//! queue.wait_idle().await;
//! assert_eq!(queue.metrics().loaded(), 2);
//! # }
//! ```

pub mod config;
pub mod metrics;
pub mod queue;

pub use config::QueueConfig;
pub use metrics::{QueueMetrics, QueueMetricsSnapshot};
pub use queue::{QueueStatus, ResourceQueue};
