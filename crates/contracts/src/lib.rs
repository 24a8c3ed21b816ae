//! # Contracts
//!
//! Frozen interface contracts, defining inter-module traits and config types.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Batching Model
//! - Elements are opaque to the engine; only the consumer inspects them
//! - A batch is an ordered, non-empty `Vec` of at most `batch_size` elements

mod config;
mod error;
mod trigger;

pub use config::*;
pub use error::*;
pub use trigger::*;
