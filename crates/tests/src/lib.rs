//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 批量触发端到端场景
//! - 并发生产者与取消语义

#[cfg(test)]
mod contract_tests {
    use contracts::TriggerConfig;

    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = TriggerConfig::default();
    }
}

#[cfg(test)]
mod stats_tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use buffer_trigger::{BatchTriggerBuilder, FnConsumer};
    use observability::BatchStatsAggregator;

    /// 聚合器串联：consumer 内记录每个批次，摘要与实际下发一致。
    #[tokio::test]
    async fn test_aggregator_tracks_dispatches() {
        let agg = Arc::new(Mutex::new(BatchStatsAggregator::new()));
        let agg_clone = Arc::clone(&agg);
        let consumer = FnConsumer::new("agg", move |batch: &[u32]| {
            agg_clone.lock().unwrap().update(batch.len(), true);
            Ok(())
        });

        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(4)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(32)
            .build()
            .unwrap();

        for i in 0..10 {
            trigger.enqueue(i).await;
        }
        trigger.manually_do_trigger().await;
        trigger.shutdown().await;

        let report = agg.lock().unwrap().summary();
        assert_eq!(report.total_batches, 3);
        assert_eq!(report.total_elements, 10);
        assert_eq!(report.total_failures, 0);
        assert_eq!(report.batch_size.max, 4.0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use buffer_trigger::{BatchTriggerBuilder, FnConsumer};
    use contracts::{BufferTrigger, TriggerError};
    use tokio::time::{sleep, timeout};

    fn recording_consumer<E: Clone + Send + Sync + 'static>(
        name: &str,
    ) -> (
        FnConsumer<impl FnMut(&[E]) -> Result<(), TriggerError> + Send>,
        Arc<Mutex<Vec<Vec<E>>>>,
    ) {
        let batches: Arc<Mutex<Vec<Vec<E>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&batches);
        let consumer = FnConsumer::new(name, move |batch: &[E]| {
            sink.lock().unwrap().push(batch.to_vec());
            Ok(())
        });
        (consumer, batches)
    }

    /// Scenario: threshold batching
    ///
    /// 验证 `force_every_tick=false` 时，tick 只在凑满 batch_size 后下发。
    #[tokio::test]
    async fn test_e2e_threshold_batching() {
        let (consumer, batches) = recording_consumer::<String>("threshold");
        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(3)
            .tick_period(Duration::from_millis(50))
            .queue_capacity(16)
            .build()
            .unwrap();

        trigger.enqueue("a".to_string()).await;
        trigger.enqueue("b".to_string()).await;
        sleep(Duration::from_millis(200)).await;
        assert!(batches.lock().unwrap().is_empty());

        trigger.enqueue("c".to_string()).await;
        sleep(Duration::from_millis(200)).await;
        assert_eq!(
            *batches.lock().unwrap(),
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]
        );

        trigger.shutdown().await;
    }

    /// Scenario: force every tick
    ///
    /// 验证 `force_every_tick=true` 时，单个元素也会在一个 tick 内下发。
    #[tokio::test]
    async fn test_e2e_force_every_tick() {
        let (consumer, batches) = recording_consumer::<String>("forced");
        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(10)
            .tick_period(Duration::from_millis(20))
            .queue_capacity(16)
            .force_every_tick(true)
            .build()
            .unwrap();

        trigger.enqueue("x".to_string()).await;
        sleep(Duration::from_millis(150)).await;

        assert_eq!(*batches.lock().unwrap(), vec![vec!["x".to_string()]]);
        trigger.shutdown().await;
    }

    /// Scenario: manual flush under threshold, synchronous from caller's view
    #[tokio::test]
    async fn test_e2e_manual_flush_returns_after_consumer() {
        let consumed = Arc::new(AtomicU64::new(0));
        let consumed_clone = Arc::clone(&consumed);
        let consumer = FnConsumer::new("slow", move |batch: &[u64]| {
            // Synchronous consumer work happens-before flush returns
            consumed_clone.fetch_add(batch.len() as u64, Ordering::SeqCst);
            Ok(())
        });

        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(100)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(16)
            .build()
            .unwrap();

        trigger.enqueue(1).await;
        trigger.enqueue(2).await;
        trigger.manually_do_trigger().await;

        assert_eq!(consumed.load(Ordering::SeqCst), 2);
        assert_eq!(trigger.pending_changes(), 0);

        trigger.shutdown().await;
    }

    /// 背靠背两次 manual flush 等价于一次（无并发生产者时）。
    #[tokio::test]
    async fn test_e2e_double_flush_idempotent() {
        let (consumer, batches) = recording_consumer::<u64>("idem");
        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(10)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(16)
            .build()
            .unwrap();

        for i in 0..5 {
            trigger.enqueue(i).await;
        }
        trigger.manually_do_trigger().await;
        trigger.manually_do_trigger().await;

        assert_eq!(*batches.lock().unwrap(), vec![vec![0, 1, 2, 3, 4]]);
        trigger.shutdown().await;
    }

    /// FIFO 顺序跨批次保持：多批下发后拼接顺序等于入队顺序。
    #[tokio::test]
    async fn test_e2e_fifo_across_batches() {
        let (consumer, batches) = recording_consumer::<u64>("fifo");
        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(7)
            .tick_period(Duration::from_millis(10))
            .queue_capacity(256)
            .force_every_tick(true)
            .build()
            .unwrap();

        for i in 0..100u64 {
            trigger.enqueue(i).await;
        }
        trigger.manually_do_trigger().await;
        sleep(Duration::from_millis(50)).await;
        trigger.manually_do_trigger().await;

        let got = batches.lock().unwrap().clone();
        let flattened: Vec<u64> = got.iter().flatten().copied().collect();
        assert_eq!(flattened, (0..100).collect::<Vec<_>>());
        assert!(got.iter().all(|b| !b.is_empty() && b.len() <= 7));

        trigger.shutdown().await;
    }

    /// Scenario: consumer failure routed to handler, engine keeps running
    #[tokio::test]
    async fn test_e2e_failure_routed_to_handler() {
        let consumer = FnConsumer::new("flaky", |_: &[u64]| {
            Err(TriggerError::consume("flaky", "downstream unavailable"))
        });

        let failed: Arc<Mutex<Vec<(String, Vec<u64>)>>> = Arc::new(Mutex::new(Vec::new()));
        let failed_clone = Arc::clone(&failed);

        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(2)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(16)
            .failure_handler(move |error: &TriggerError, batch: Vec<u64>| {
                failed_clone
                    .lock()
                    .unwrap()
                    .push((error.to_string(), batch));
                Ok(())
            })
            .build()
            .unwrap();

        trigger.enqueue(1).await;
        trigger.enqueue(2).await;
        trigger.manually_do_trigger().await;

        let got = failed.lock().unwrap().clone();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].1, vec![1, 2]);
        assert!(got[0].0.contains("downstream unavailable"));

        // Engine still accepts and drains after the failure
        trigger.enqueue(3).await;
        trigger.enqueue(4).await;
        trigger.manually_do_trigger().await;
        assert_eq!(failed.lock().unwrap().len(), 2);
        assert_eq!(trigger.pending_changes(), 0);

        trigger.shutdown().await;
    }

    /// Scenario: handler failure is swallowed, nothing escapes the flush
    #[tokio::test]
    async fn test_e2e_handler_failure_contained() {
        let consumer = FnConsumer::new("flaky", |_: &[u64]| {
            Err(TriggerError::consume("flaky", "boom"))
        });

        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(2)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(16)
            .failure_handler(|_: &TriggerError, _: Vec<u64>| {
                Err(TriggerError::handler("handler also boom"))
            })
            .build()
            .unwrap();

        trigger.enqueue(1).await;
        trigger.enqueue(2).await;
        trigger.manually_do_trigger().await;

        let snapshot = trigger.metrics();
        assert_eq!(snapshot.failure_count, 1);
        assert_eq!(snapshot.handler_failure_count, 1);

        trigger.shutdown().await;
    }

    /// 取消语义：队列满时放弃 enqueue，元素不入队。
    #[tokio::test]
    async fn test_e2e_cancelled_enqueue_drops_element() {
        let (consumer, batches) = recording_consumer::<u64>("cancel");
        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(10)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(1)
            .build()
            .unwrap();

        trigger.enqueue(1).await;
        // Queue full: the enqueue future blocks; dropping it via timeout
        // cancels the append
        let cancelled = timeout(Duration::from_millis(50), trigger.enqueue(2)).await;
        assert!(cancelled.is_err());

        trigger.manually_do_trigger().await;
        assert_eq!(*batches.lock().unwrap(), vec![vec![1]]);

        trigger.shutdown().await;
    }

    /// 多生产者并发：每个接受的元素恰好消费一次。
    #[tokio::test]
    async fn test_e2e_concurrent_producers() {
        let delivered = Arc::new(AtomicU64::new(0));
        let delivered_clone = Arc::clone(&delivered);
        let consumer = FnConsumer::new("counter", move |batch: &[u64]| {
            delivered_clone.fetch_add(batch.len() as u64, Ordering::Relaxed);
            Ok(())
        });

        let trigger = Arc::new(
            BatchTriggerBuilder::new(consumer)
                .batch_size(32)
                .tick_period(Duration::from_millis(5))
                .queue_capacity(128)
                .force_every_tick(true)
                .build()
                .unwrap(),
        );

        let mut producers = Vec::new();
        for p in 0..8u64 {
            let trigger = Arc::clone(&trigger);
            producers.push(tokio::spawn(async move {
                for i in 0..500u64 {
                    trigger.enqueue(p * 10_000 + i).await;
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }

        trigger.manually_do_trigger().await;
        assert_eq!(delivered.load(Ordering::Relaxed), 4000);

        let trigger = Arc::try_unwrap(trigger).ok().unwrap();
        trigger.shutdown().await;
    }

    /// 通过 BufferTrigger trait 多态使用引擎。
    #[tokio::test]
    async fn test_e2e_capability_surface() {
        async fn pump<T: BufferTrigger<u64>>(trigger: &T, n: u64) {
            for i in 0..n {
                trigger.enqueue(i).await;
            }
            trigger.manually_do_trigger().await;
        }

        let delivered = Arc::new(AtomicU64::new(0));
        let delivered_clone = Arc::clone(&delivered);
        let consumer = FnConsumer::new("poly", move |batch: &[u64]| {
            delivered_clone.fetch_add(batch.len() as u64, Ordering::Relaxed);
            Ok(())
        });

        let trigger = BatchTriggerBuilder::new(consumer)
            .batch_size(4)
            .tick_period(Duration::from_secs(60))
            .queue_capacity(64)
            .build()
            .unwrap();

        pump(&trigger, 10).await;
        assert_eq!(delivered.load(Ordering::Relaxed), 10);
        assert_eq!(BufferTrigger::pending_changes(&trigger), 0);

        trigger.shutdown().await;
    }
}
