//! Bundled consumer implementations
//!
//! Contains FnConsumer and LogConsumer.

use contracts::{BatchConsumer, TriggerError};
use tracing::{info, instrument};

/// Consumer that wraps a plain closure
///
/// Useful for tests and for sinks with no internal state worth naming a
/// type for.
pub struct FnConsumer<F> {
    name: String,
    f: F,
}

impl<F> FnConsumer<F> {
    /// Wrap a closure as a consumer
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<E, F> BatchConsumer<E> for FnConsumer<F>
where
    E: Sync,
    F: FnMut(&[E]) -> Result<(), TriggerError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn consume(&mut self, batch: &[E]) -> Result<(), TriggerError> {
        (self.f)(batch)
    }
}

/// Consumer that logs batch summaries for debugging
pub struct LogConsumer {
    name: String,
}

impl LogConsumer {
    /// Create a new LogConsumer with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<E> BatchConsumer<E> for LogConsumer
where
    E: Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_consumer_consume",
        skip(self, batch),
        fields(consumer = %self.name, batch_len = batch.len())
    )]
    async fn consume(&mut self, batch: &[E]) -> Result<(), TriggerError> {
        info!(consumer = %self.name, batch_len = batch.len(), "batch received");
        Ok(())
    }
}
