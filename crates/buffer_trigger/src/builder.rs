//! Fluent builder for [`BatchTrigger`]

use std::time::Duration;

use contracts::{BatchConsumer, FailureHandler, TriggerConfig, TriggerError};

use crate::trigger::BatchTrigger;

/// Builder for creating a [`BatchTrigger`]
///
/// Validates the configuration once; the engine itself is immutable after
/// construction.
pub struct BatchTriggerBuilder<E, C> {
    config: TriggerConfig,
    consumer: C,
    handler: Option<Box<dyn FailureHandler<E>>>,
}

impl<E, C> BatchTriggerBuilder<E, C>
where
    E: Send + 'static,
    C: BatchConsumer<E> + 'static,
{
    /// Create a builder with default configuration and the given consumer
    pub fn new(consumer: C) -> Self {
        Self {
            config: TriggerConfig::default(),
            consumer,
            handler: None,
        }
    }

    /// Create a builder from an existing configuration
    pub fn from_config(config: TriggerConfig, consumer: C) -> Self {
        Self {
            config,
            consumer,
            handler: None,
        }
    }

    /// Maximum elements per consumer invocation
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Fixed delay between dispatcher runs
    pub fn tick_period(mut self, period: Duration) -> Self {
        self.config.tick_period_ms = period.as_millis() as u64;
        self
    }

    /// Ingress buffer capacity
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Drain partial batches on every tick
    pub fn force_every_tick(mut self, force: bool) -> Self {
        self.config.force_every_tick = force;
        self
    }

    /// Route consumer failures to the given handler instead of the log
    pub fn failure_handler(mut self, handler: impl FailureHandler<E> + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Validate the configuration, start the tick task, and return the trigger
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    /// Returns [`TriggerError::ConfigValidation`] for a zero batch size,
    /// tick period, or queue capacity.
    pub fn build(self) -> Result<BatchTrigger<E, C>, TriggerError> {
        self.config.validate()?;
        Ok(BatchTrigger::start(self.config, self.consumer, self.handler))
    }
}

/// Convenience function to create a trigger from a configuration
pub fn create_trigger<E, C>(
    config: TriggerConfig,
    consumer: C,
) -> Result<BatchTrigger<E, C>, TriggerError>
where
    E: Send + 'static,
    C: BatchConsumer<E> + 'static,
{
    BatchTriggerBuilder::from_config(config, consumer).build()
}
