//! Layered error definitions
//!
//! Categorized by source: config / consumer / handler

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum TriggerError {
    // ===== Configuration Errors =====
    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Consumer Errors =====
    /// Batch consumer failed for a whole batch
    #[error("consumer '{consumer}' failed: {message}")]
    Consume {
        consumer: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Handler Errors =====
    /// Failure handler itself failed
    #[error("failure handler failed: {message}")]
    Handler { message: String },

    // ===== General Errors =====
    /// Trigger already shut down
    #[error("trigger is closed")]
    Closed,

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl TriggerError {
    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create consumer failure error
    pub fn consume(consumer: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Consume {
            consumer: consumer.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create consumer failure error wrapping an underlying cause
    pub fn consume_with_source(
        consumer: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Consume {
            consumer: consumer.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create handler failure error
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }
}
