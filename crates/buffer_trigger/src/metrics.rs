//! Trigger metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single trigger instance
#[derive(Debug, Default)]
pub struct TriggerMetrics {
    /// Total elements accepted by enqueue
    enqueued_count: AtomicU64,
    /// Total batches handed to the consumer
    batch_count: AtomicU64,
    /// Total elements in successfully consumed batches
    consumed_count: AtomicU64,
    /// Total batches the consumer failed on
    failure_count: AtomicU64,
    /// Total failure-handler errors
    handler_failure_count: AtomicU64,
    /// Total elements dropped because the trigger was closed
    dropped_count: AtomicU64,
}

impl TriggerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total enqueued count
    pub fn enqueued_count(&self) -> u64 {
        self.enqueued_count.load(Ordering::Relaxed)
    }

    /// Increment enqueued count
    pub fn inc_enqueued_count(&self) {
        self.enqueued_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total batch count
    pub fn batch_count(&self) -> u64 {
        self.batch_count.load(Ordering::Relaxed)
    }

    /// Increment batch count
    pub fn inc_batch_count(&self) {
        self.batch_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total consumed-element count
    pub fn consumed_count(&self) -> u64 {
        self.consumed_count.load(Ordering::Relaxed)
    }

    /// Add to consumed-element count
    pub fn add_consumed(&self, n: u64) {
        self.consumed_count.fetch_add(n, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get handler failure count
    pub fn handler_failure_count(&self) -> u64 {
        self.handler_failure_count.load(Ordering::Relaxed)
    }

    /// Increment handler failure count
    pub fn inc_handler_failure_count(&self) {
        self.handler_failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> TriggerSnapshot {
        TriggerSnapshot {
            enqueued_count: self.enqueued_count(),
            batch_count: self.batch_count(),
            consumed_count: self.consumed_count(),
            failure_count: self.failure_count(),
            handler_failure_count: self.handler_failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of trigger metrics (for reporting)
#[derive(Debug, Clone, Copy)]
pub struct TriggerSnapshot {
    pub enqueued_count: u64,
    pub batch_count: u64,
    pub consumed_count: u64,
    pub failure_count: u64,
    pub handler_failure_count: u64,
    pub dropped_count: u64,
}
