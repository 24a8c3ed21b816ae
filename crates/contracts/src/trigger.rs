//! BufferTrigger trait - batching capability surface
//!
//! Defines the abstract interface consumed by producers, plus the
//! consumer-side traits invoked by an engine.

use crate::TriggerError;

/// Batching buffer capability
///
/// Implemented by any engine that accumulates single elements and hands
/// them downstream in batches. Alternative batching strategies sit behind
/// this same surface.
#[trait_variant::make(BufferTrigger: Send)]
pub trait LocalBufferTrigger<E> {
    /// Buffer one element
    ///
    /// Awaits while the ingress buffer is full. Dropping the returned
    /// future before completion leaves the element un-enqueued. Never
    /// executes consumer code.
    async fn enqueue(&self, element: E);

    /// Drain the buffer to empty, synchronously from the caller's view
    ///
    /// Ignores the batch-size threshold; returns only after the final
    /// consumer invocation has completed.
    async fn manually_do_trigger(&self);

    /// Approximate count of buffered elements
    ///
    /// Lock-free snapshot for metrics and monitoring; may lag concurrent
    /// enqueues and drains.
    fn pending_changes(&self) -> usize;
}

/// Batch sink trait
///
/// All consumer implementations must implement this trait. The engine
/// invokes `consume` with each drained batch; batches are never empty and
/// never longer than the configured batch size.
#[trait_variant::make(BatchConsumer: Send)]
pub trait LocalBatchConsumer<E> {
    /// Consumer name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume one batch
    ///
    /// # Errors
    /// A returned error is routed through the engine's failure funnel;
    /// it never propagates to producers. Failed batches are not retried.
    async fn consume(&mut self, batch: &[E]) -> Result<(), TriggerError>;
}

/// Consumer-failure route
///
/// Receives the consumer's error together with ownership of the batch it
/// was processing, so callers can implement retry/persist/drop policies
/// outside the engine.
pub trait FailureHandler<E>: Send {
    /// Handle one failed batch
    ///
    /// # Errors
    /// An error from the handler itself is logged by the engine and
    /// swallowed; it never propagates.
    fn on_failure(&mut self, error: &TriggerError, batch: Vec<E>) -> Result<(), TriggerError>;
}

impl<E, F> FailureHandler<E> for F
where
    F: FnMut(&TriggerError, Vec<E>) -> Result<(), TriggerError> + Send,
{
    fn on_failure(&mut self, error: &TriggerError, batch: Vec<E>) -> Result<(), TriggerError> {
        self(error, batch)
    }
}
