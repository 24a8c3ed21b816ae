//! Trigger configuration contracts that can be shared across crates.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::TriggerError;

/// Batching trigger configuration
///
/// All fields are fixed at construction; there is no dynamic reconfiguration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Maximum elements handed to the consumer in one invocation
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Fixed delay between dispatcher runs, in milliseconds
    /// (end of previous run to start of next run)
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Ingress buffer capacity; producers block when full
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Drain any non-empty queue on every tick instead of waiting
    /// for `batch_size` elements to accumulate
    #[serde(default)]
    pub force_every_tick: bool,
}

fn default_batch_size() -> usize {
    100
}

fn default_tick_period_ms() -> u64 {
    1000
}

fn default_queue_capacity() -> usize {
    1024
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            tick_period_ms: default_tick_period_ms(),
            queue_capacity: default_queue_capacity(),
            force_every_tick: false,
        }
    }
}

impl TriggerConfig {
    /// Tick period as a [`Duration`]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// Validate the configuration
    ///
    /// Returns the first error encountered, or Ok(()).
    pub fn validate(&self) -> Result<(), TriggerError> {
        if self.batch_size == 0 {
            return Err(TriggerError::config_validation(
                "batch_size",
                "must be > 0, got 0",
            ));
        }
        if self.tick_period_ms == 0 {
            return Err(TriggerError::config_validation(
                "tick_period_ms",
                "must be > 0, got 0",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(TriggerError::config_validation(
                "queue_capacity",
                "must be > 0, got 0",
            ));
        }
        Ok(())
    }
}
