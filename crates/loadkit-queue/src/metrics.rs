use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing the lifetime of a resource queue
#[derive(Debug, Default)]
pub struct QueueMetrics {
    enqueued: AtomicU64,
    loaded: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
    drains_started: AtomicU64,
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_enqueue(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_loaded(&self) {
        self.loaded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_discarded(&self, count: u64) {
        if count != 0 {
            self.discarded.fetch_add(count, Ordering::Relaxed);
        }
    }

    pub fn record_drain_started(&self) {
        self.drains_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn enqueued(&self) -> u64 {
        self.enqueued.load(Ordering::Relaxed)
    }

    pub fn loaded(&self) -> u64 {
        self.loaded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    /// Number of drain loops spawned over the queue's lifetime
    pub fn drains_started(&self) -> u64 {
        self.drains_started.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            enqueued: self.enqueued(),
            loaded: self.loaded(),
            failed: self.failed(),
            discarded: self.discarded(),
            drains_started: self.drains_started(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueMetricsSnapshot {
    pub enqueued: u64,
    pub loaded: u64,
    pub failed: u64,
    pub discarded: u64,
    pub drains_started: u64,
}

impl QueueMetricsSnapshot {
    /// Items that reached a loader, successfully or not
    pub fn attempted(&self) -> u64 {
        self.loaded + self.failed
    }
}
