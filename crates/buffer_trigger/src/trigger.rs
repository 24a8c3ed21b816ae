//! BatchTrigger - batching engine driven by a periodic tick

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, error, instrument, warn};

use contracts::{BatchConsumer, BufferTrigger, FailureHandler, TriggerConfig, TriggerError};

use crate::metrics::{TriggerMetrics, TriggerSnapshot};

/// Boxed consumer-failure route
pub(crate) type BoxedFailureHandler<E> = Box<dyn FailureHandler<E>>;

/// What gates the drain loop
#[derive(Debug, Clone, Copy)]
enum DrainMode {
    /// Regular tick: drain while a full batch is buffered, or while
    /// anything is buffered when `force_every_tick` is set
    Tick,
    /// Manual flush: drain to empty regardless of thresholds
    Flush,
}

/// State touched only while holding the dispatch lock
struct DrainState<E, C> {
    rx: mpsc::Receiver<E>,
    consumer: C,
    handler: Option<BoxedFailureHandler<E>>,
}

/// Shared between the trigger handle and the tick task
struct Inner<E, C> {
    batch_size: usize,
    force_every_tick: bool,
    /// Dispatch lock: at most one drain in progress per instance
    state: Mutex<DrainState<E, C>>,
    metrics: TriggerMetrics,
}

impl<E, C> Inner<E, C>
where
    E: Send,
    C: BatchConsumer<E>,
{
    fn should_drain(&self, rx: &mpsc::Receiver<E>, mode: DrainMode) -> bool {
        match mode {
            DrainMode::Tick => {
                rx.len() >= self.batch_size || (self.force_every_tick && !rx.is_empty())
            }
            DrainMode::Flush => !rx.is_empty(),
        }
    }

    /// Drain loop body, run under the dispatch lock
    ///
    /// Forms batches of up to `batch_size` and hands each to the consumer
    /// until the drain condition no longer holds. Returns the number of
    /// batches dispatched.
    async fn drain(&self, state: &mut DrainState<E, C>, mode: DrainMode) -> u64 {
        let mut batches = 0u64;

        while self.should_drain(&state.rx, mode) {
            // Fresh container per batch; once handed off it is never reused
            let mut batch = Vec::with_capacity(self.batch_size.min(state.rx.len()));
            while batch.len() < self.batch_size {
                match state.rx.try_recv() {
                    Ok(element) => batch.push(element),
                    Err(_) => break,
                }
            }

            if batch.is_empty() {
                break;
            }

            batches += 1;
            self.metrics.inc_batch_count();

            match state.consumer.consume(&batch).await {
                Ok(()) => {
                    self.metrics.add_consumed(batch.len() as u64);
                }
                Err(consume_error) => {
                    self.metrics.inc_failure_count();
                    self.route_failure(
                        state.consumer.name(),
                        &mut state.handler,
                        consume_error,
                        batch,
                    );
                }
            }
        }

        batches
    }

    /// Failure funnel: consumer errors go to the handler if one is
    /// registered, otherwise to the log. Nothing propagates; failed
    /// batches are not retried.
    fn route_failure(
        &self,
        consumer: &str,
        handler: &mut Option<BoxedFailureHandler<E>>,
        consume_error: TriggerError,
        batch: Vec<E>,
    ) {
        let batch_len = batch.len();
        match handler.as_mut() {
            Some(handler) => {
                if let Err(handler_error) = handler.on_failure(&consume_error, batch) {
                    self.metrics.inc_handler_failure_count();
                    error!(
                        consumer = %consumer,
                        batch_len,
                        consume_error = %consume_error,
                        handler_error = %handler_error,
                        "failure handler failed while handling consumer error"
                    );
                }
            }
            None => {
                error!(
                    consumer = %consumer,
                    batch_len,
                    error = %consume_error,
                    "batch consumer failed, batch dropped"
                );
            }
        }
    }
}

/// Batching buffer trigger
///
/// Producers `enqueue` single elements; a spawned tick task periodically
/// drains them in batches of up to `batch_size` into the consumer. Enqueue
/// never executes consumer code and never touches the dispatch lock, so a
/// slow consumer only backpressures producers through queue capacity.
pub struct BatchTrigger<E, C> {
    tx: mpsc::Sender<E>,
    inner: Arc<Inner<E, C>>,
    shutdown_tx: watch::Sender<bool>,
    tick_handle: JoinHandle<()>,
}

impl<E, C> BatchTrigger<E, C>
where
    E: Send + 'static,
    C: BatchConsumer<E> + 'static,
{
    /// Start a trigger from validated parts and spawn its tick task
    ///
    /// Must be called within a tokio runtime. Prefer
    /// [`BatchTriggerBuilder`](crate::builder::BatchTriggerBuilder), which
    /// validates the configuration first.
    pub(crate) fn start(
        config: TriggerConfig,
        consumer: C,
        handler: Option<BoxedFailureHandler<E>>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(Inner {
            batch_size: config.batch_size,
            force_every_tick: config.force_every_tick,
            state: Mutex::new(DrainState {
                rx,
                consumer,
                handler,
            }),
            metrics: TriggerMetrics::new(),
        });

        let tick_inner = Arc::clone(&inner);
        let tick_handle = tokio::spawn(async move {
            tick_loop(tick_inner, config.tick_period(), shutdown_rx).await;
        });

        Self {
            tx,
            inner,
            shutdown_tx,
            tick_handle,
        }
    }

    /// Buffer one element
    ///
    /// Awaits while the queue is full. Dropping the future before it
    /// completes leaves the element un-enqueued.
    pub async fn enqueue(&self, element: E) {
        match self.tx.send(element).await {
            Ok(()) => {
                self.inner.metrics.inc_enqueued_count();
            }
            Err(_) => {
                // Only reachable once the tick task has been torn down
                self.inner.metrics.inc_dropped_count();
                warn!("trigger closed, element dropped");
            }
        }
    }

    /// Drain the queue to empty through the consumer
    ///
    /// Ignores the batch-size threshold and `force_every_tick`. Shares the
    /// dispatch lock with the tick task; if a tick is draining, this waits
    /// for it. Returns only after the final consumer invocation completes.
    #[instrument(name = "trigger_manual_flush", skip(self))]
    pub async fn manually_do_trigger(&self) {
        let mut state = self.inner.state.lock().await;
        let batches = self.inner.drain(&mut state, DrainMode::Flush).await;
        debug!(batches, "manual flush complete");
    }

    /// Approximate count of buffered elements
    ///
    /// Read without the dispatch lock; a snapshot for metrics and
    /// monitoring only.
    pub fn pending_changes(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    /// Get current metrics
    pub fn metrics(&self) -> TriggerSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Stop the tick task and wait for it to finish
    ///
    /// An in-progress drain completes first. Elements still buffered are
    /// not delivered; call [`manually_do_trigger`](Self::manually_do_trigger)
    /// beforehand if delivery is required.
    #[instrument(name = "trigger_shutdown", skip(self))]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.tick_handle.await {
            error!(error = ?e, "tick task panicked");
        }
        debug!(
            pending = self.tx.max_capacity() - self.tx.capacity(),
            "trigger shutdown complete"
        );
    }
}

impl<E, C> BufferTrigger<E> for BatchTrigger<E, C>
where
    E: Send + 'static,
    C: BatchConsumer<E> + 'static,
{
    async fn enqueue(&self, element: E) {
        BatchTrigger::enqueue(self, element).await;
    }

    async fn manually_do_trigger(&self) {
        BatchTrigger::manually_do_trigger(self).await;
    }

    fn pending_changes(&self) -> usize {
        BatchTrigger::pending_changes(self)
    }
}

/// Periodic dispatcher loop
///
/// Fixed delay, not fixed rate: the next sleep starts only after the
/// previous drain has finished, so a long consumer run never causes tick
/// storms afterwards. Exits when shutdown is signalled or the trigger
/// handle is dropped.
async fn tick_loop<E, C>(
    inner: Arc<Inner<E, C>>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    E: Send,
    C: BatchConsumer<E>,
{
    debug!(period_ms = period.as_millis() as u64, "tick task started");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => break,
            _ = time::sleep(period) => {}
        }

        let mut state = inner.state.lock().await;
        let batches = inner.drain(&mut state, DrainMode::Tick).await;
        if batches > 0 {
            debug!(batches, "tick drained");
        }
    }

    debug!("tick task stopped");
}
