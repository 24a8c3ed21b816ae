//! # Buffer Trigger
//!
//! 批量缓冲触发模块。
//!
//! 负责：
//! - 累积生产者逐个写入的元素
//! - 按 tick 周期 / 阈值批量下发到 consumer
//! - 隔离 consumer 失败，不阻塞生产者
//!
//! ## 使用示例
//!
//! ```ignore
//! use buffer_trigger::{BatchTriggerBuilder, FnConsumer};
//! use std::time::Duration;
//!
//! let consumer = FnConsumer::new("printer", |batch: &[String]| {
//!     println!("batch of {}", batch.len());
//!     Ok(())
//! });
//!
//! let trigger = BatchTriggerBuilder::new(consumer)
//!     .batch_size(50)
//!     .tick_period(Duration::from_millis(200))
//!     .queue_capacity(1000)
//!     .build()?;
//!
//! trigger.enqueue("hello".to_string()).await;
//! trigger.manually_do_trigger().await;
//! trigger.shutdown().await;
//! ```

pub mod builder;
pub mod consumers;
pub mod metrics;
pub mod trigger;

pub use contracts::{BatchConsumer, BufferTrigger, FailureHandler, TriggerConfig, TriggerError};

pub use builder::{create_trigger, BatchTriggerBuilder};
pub use consumers::{FnConsumer, LogConsumer};
pub use metrics::{TriggerMetrics, TriggerSnapshot};
pub use trigger::BatchTrigger;
