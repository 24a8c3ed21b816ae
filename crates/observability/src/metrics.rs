//! 批量触发器指标收集模块
//!
//! 记录批量下发链路的 Prometheus 指标，并在内存中聚合统计摘要。

use metrics::{counter, gauge, histogram};

/// 记录一次批量下发
///
/// 每次 consumer 被调用（成功或失败）时调用此函数来记录指标。
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_batch_dispatched;
///
/// record_batch_dispatched("db_writer", batch.len(), result.is_ok());
/// ```
pub fn record_batch_dispatched(trigger: &str, batch_len: usize, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "buffer_trigger_batches_total",
        "trigger" => trigger.to_string(),
        "status" => status.to_string()
    )
    .increment(1);

    counter!(
        "buffer_trigger_elements_total",
        "trigger" => trigger.to_string(),
        "status" => status.to_string()
    )
    .increment(batch_len as u64);

    histogram!(
        "buffer_trigger_batch_size",
        "trigger" => trigger.to_string()
    )
    .record(batch_len as f64);
}

/// 记录元素入队
pub fn record_elements_enqueued(trigger: &str, count: u64) {
    counter!(
        "buffer_trigger_elements_enqueued_total",
        "trigger" => trigger.to_string()
    )
    .increment(count);
}

/// 记录缓冲区深度
pub fn record_pending_depth(trigger: &str, depth: usize) {
    gauge!(
        "buffer_trigger_pending_elements",
        "trigger" => trigger.to_string()
    )
    .set(depth as f64);
}

/// 批量下发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BatchStatsAggregator {
    /// 总批次数
    pub total_batches: u64,

    /// 总元素数
    pub total_elements: u64,

    /// 失败批次数
    pub total_failures: u64,

    /// 批大小统计
    pub batch_size_stats: RunningStats,
}

impl BatchStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, batch_len: usize, success: bool) {
        self.total_batches += 1;
        self.total_elements += batch_len as u64;
        if !success {
            self.total_failures += 1;
        }
        self.batch_size_stats.push(batch_len as f64);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> StatsReport {
        StatsReport {
            total_batches: self.total_batches,
            total_elements: self.total_elements,
            total_failures: self.total_failures,
            failure_rate: if self.total_batches > 0 {
                self.total_failures as f64 / self.total_batches as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_size_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct StatsReport {
    pub total_batches: u64,
    pub total_elements: u64,
    pub total_failures: u64,
    pub failure_rate: f64,
    pub batch_size: StatsSummary,
}

impl std::fmt::Display for StatsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Batch Dispatch Summary ===")?;
        writeln!(f, "Total batches: {}", self.total_batches)?;
        writeln!(f, "Total elements: {}", self.total_elements)?;
        writeln!(
            f,
            "Failed batches: {} ({:.2}%)",
            self.total_failures, self.failure_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本标准差
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }
}
