//! Log Shipper Demo
//!
//! Simulates many producer tasks emitting log lines into a batching
//! trigger, with a consumer that "ships" each batch downstream. Shows the
//! builder, the failure funnel, manual flush, and the metrics snapshot.
//!
//! Run with: cargo run --bin log_shipper

use std::time::Duration;

use buffer_trigger::{BatchTriggerBuilder, FnConsumer};
use contracts::TriggerError;
use observability::metrics::record_batch_dispatched;
use observability::{LogFormat, ObservabilityConfig};
use std::sync::Arc;
use tokio::time::sleep;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init_with_config(ObservabilityConfig {
        log_format: LogFormat::Pretty,
        metrics_port: None,
        default_log_level: "info".to_string(),
    })?;

    tracing::info!("Starting Log Shipper Demo");

    // ==== Stage 1: Consumer that ships batches downstream ====
    let mut shipped = 0u64;
    let consumer = FnConsumer::new("shipper", move |batch: &[String]| {
        // Every tenth batch fails to demonstrate the failure funnel
        shipped += 1;
        let ok = shipped % 10 != 0;
        record_batch_dispatched("shipper", batch.len(), ok);
        if ok {
            tracing::info!(batch_len = batch.len(), "batch shipped");
            Ok(())
        } else {
            Err(TriggerError::consume("shipper", "simulated downstream outage"))
        }
    });

    // ==== Stage 2: Build the trigger ====
    let trigger = Arc::new(
        BatchTriggerBuilder::new(consumer)
            .batch_size(50)
            .tick_period(Duration::from_millis(200))
            .queue_capacity(1000)
            .force_every_tick(true)
            .failure_handler(|error: &TriggerError, batch: Vec<String>| {
                tracing::warn!(
                    error = %error,
                    lost = batch.len(),
                    "batch failed, dropping (no retry in the engine)"
                );
                Ok(())
            })
            .build()?,
    );

    // ==== Stage 3: Spawn producers ====
    let mut producers = Vec::new();
    for p in 0..4 {
        let trigger = Arc::clone(&trigger);
        producers.push(tokio::spawn(async move {
            for i in 0..500 {
                trigger.enqueue(format!("producer-{p} line-{i}")).await;
                sleep(Duration::from_millis(1)).await;
            }
        }));
    }

    for producer in producers {
        producer.await?;
    }

    // ==== Stage 4: Flush the tail and report ====
    trigger.manually_do_trigger().await;

    let snapshot = trigger.metrics();
    tracing::info!(
        enqueued = snapshot.enqueued_count,
        batches = snapshot.batch_count,
        consumed = snapshot.consumed_count,
        failed_batches = snapshot.failure_count,
        "Log shipper finished"
    );

    if let Ok(trigger) = Arc::try_unwrap(trigger) {
        trigger.shutdown().await;
    }

    Ok(())
}
