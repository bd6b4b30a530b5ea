//! Priority-ordered sequential resource loader

use crate::config::QueueConfig;
use crate::metrics::QueueMetrics;
use futures::FutureExt;
use loadkit_core::{BoxLoader, LoaderError};
use parking_lot::Mutex;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Notify;
use tracing::{debug, error, info};

/// A pending load in the backlog
struct QueuedResource {
    id: String,
    priority: i32,
    /// Insertion order, breaks ties between equal priorities (FIFO)
    seq: u64,
    loader: BoxLoader<()>,
}

impl PartialEq for QueuedResource {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedResource {}

impl PartialOrd for QueuedResource {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedResource {
    // BinaryHeap pops the greatest element: highest priority, then oldest
    fn cmp(&self, other: &Self) -> CmpOrdering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Read-only snapshot of the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueStatus {
    /// Items waiting in the backlog (not counting one in flight)
    pub pending: usize,
    /// Whether a drain loop currently owns the queue
    pub is_processing: bool,
}

struct QueueInner {
    /// Pending items, highest priority first
    backlog: Mutex<BinaryHeap<QueuedResource>>,
    next_seq: AtomicU64,
    /// Set while a drain loop owns the backlog
    processing: AtomicBool,
    /// Bumped by `clear_queue`; a drain loop from an older epoch stops after its in-flight item
    epoch: AtomicU64,
    /// Held while a loader runs so loads never overlap, even across epochs
    run_slot: tokio::sync::Mutex<()>,
    idle: Notify,
    metrics: Arc<QueueMetrics>,
    config: QueueConfig,
}

/// Serializes a dynamic, priority-ordered backlog of asynchronous loads
///
/// Items are drained one at a time by a single Tokio task. A loader failure
/// is logged and swallowed; the queue moves on to the next item. Cloning
/// the queue yields another handle to the same backlog.
#[derive(Clone)]
pub struct ResourceQueue {
    inner: Arc<QueueInner>,
}

impl ResourceQueue {
    /// Create a new, empty resource queue
    pub fn new(config: QueueConfig) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                backlog: Mutex::new(BinaryHeap::new()),
                next_seq: AtomicU64::new(0),
                processing: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                run_slot: tokio::sync::Mutex::new(()),
                idle: Notify::new(),
                metrics: Arc::new(QueueMetrics::new()),
                config,
            }),
        }
    }

    /// Create a queue with default configuration
    pub fn with_defaults() -> Self {
        Self::new(QueueConfig::default())
    }

    /// Add a loader to the backlog and start draining if idle
    ///
    /// Higher `priority` values load sooner; equal priorities load in the
    /// order they were added. The loader's value is discarded.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime while the queue is idle,
    /// since the drain loop is spawned as a Tokio task.
    pub fn add_resource<T>(&self, id: impl Into<String>, loader: BoxLoader<T>, priority: i32)
    where
        T: Send + 'static,
    {
        let id = id.into();
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        let loader: BoxLoader<()> =
            Box::new(move || loader().map(|result| result.map(drop)).boxed());

        debug!(resource = %id, priority, "Queued resource");
        let claimed = {
            let mut backlog = self.inner.backlog.lock();
            backlog.push(QueuedResource {
                id,
                priority,
                seq,
                loader,
            });
            self.claim_drain()
        };
        self.inner.metrics.record_enqueue();

        if let Some(epoch) = claimed {
            tokio::spawn(drain(Arc::clone(&self.inner), epoch));
        }
    }

    /// Add a loader with the default priority of 0
    pub fn add_resource_default<T>(&self, id: impl Into<String>, loader: BoxLoader<T>)
    where
        T: Send + 'static,
    {
        self.add_resource(id, loader, 0);
    }

    /// Discard every pending item and release the drain flag
    ///
    /// A loader that is already running is not cancelled; it settles and its
    /// drain loop then stops. An item that was dequeued but is still waiting
    /// for a running loader to settle is dropped as well. Returns the number
    /// of items discarded from the backlog.
    pub fn clear_queue(&self) -> usize {
        let discarded = {
            let mut backlog = self.inner.backlog.lock();
            let discarded = backlog.len();
            backlog.clear();
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            self.inner.processing.store(false, Ordering::SeqCst);
            discarded
        };

        self.inner.metrics.record_discarded(discarded as u64);
        self.inner.idle.notify_waiters();
        info!(discarded, "Cleared resource queue");
        discarded
    }

    /// Snapshot of the backlog size and drain state
    pub fn get_queue_status(&self) -> QueueStatus {
        let backlog = self.inner.backlog.lock();
        QueueStatus {
            pending: backlog.len(),
            is_processing: self.inner.processing.load(Ordering::SeqCst),
        }
    }

    /// Wait until the backlog is empty and no drain loop is running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            let status = self.get_queue_status();
            if status.pending == 0 && !status.is_processing {
                return;
            }
            notified.await;
        }
    }

    /// Get queue metrics
    pub fn metrics(&self) -> Arc<QueueMetrics> {
        Arc::clone(&self.inner.metrics)
    }

    /// Get the queue configuration
    pub fn config(&self) -> &QueueConfig {
        &self.inner.config
    }

    /// Claim ownership of the backlog for a new drain loop. Only the caller
    /// that flips the flag gets the current epoch back. Must be called with
    /// the backlog lock held.
    fn claim_drain(&self) -> Option<u64> {
        self.inner
            .processing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| self.inner.epoch.load(Ordering::SeqCst))
    }
}

impl Default for ResourceQueue {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for ResourceQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.get_queue_status();
        f.debug_struct("ResourceQueue")
            .field("pending", &status.pending)
            .field("is_processing", &status.is_processing)
            .field("inter_item_delay", &self.inner.config.inter_item_delay)
            .finish()
    }
}

/// Drain loop: runs until the backlog is empty or the queue is cleared
async fn drain(inner: Arc<QueueInner>, epoch: u64) {
    debug!(epoch, "Resource queue drain started");
    inner.metrics.record_drain_started();

    loop {
        // Epoch check, pop and flag release happen under the backlog lock so a
        // concurrent add_resource either sees the item popped or the flag free.
        let item = {
            let mut backlog = inner.backlog.lock();
            if inner.epoch.load(Ordering::SeqCst) != epoch {
                debug!(epoch, "Resource queue cleared, stopping drain");
                return;
            }
            match backlog.pop() {
                Some(item) => item,
                None => {
                    inner.processing.store(false, Ordering::SeqCst);
                    break;
                }
            }
        };

        let QueuedResource {
            id,
            priority,
            loader,
            ..
        } = item;

        let start = Instant::now();
        let result = {
            let _slot = inner.run_slot.lock().await;
            // A clear that landed while waiting for the slot owns this item too
            if inner.epoch.load(Ordering::SeqCst) != epoch {
                debug!(resource = %id, epoch, "Resource queue cleared before load started");
                inner.metrics.record_discarded(1);
                return;
            }
            run_loader(loader).await
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                info!(resource = %id, priority, elapsed_ms, "Loaded resource");
                inner.metrics.record_loaded();
            }
            Err(e) => {
                error!(resource = %id, priority, elapsed_ms, "Failed to load resource: {}", e);
                inner.metrics.record_failed();
            }
        }

        if !inner.config.inter_item_delay.is_zero() {
            tokio::time::sleep(inner.config.inter_item_delay).await;
        }
    }

    inner.idle.notify_waiters();
    debug!(epoch, "Resource queue drained");
}

/// Run a loader, turning a panic into an ordinary failure
async fn run_loader(loader: BoxLoader<()>) -> Result<(), LoaderError> {
    match AssertUnwindSafe(async move { loader().await })
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(_) => Err("loader panicked".into()),
    }
}
