//! Wall-clock and memory accounting for pipeline stages.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use sysinfo::{get_current_pid, ProcessesToUpdate, System};
use tracing::debug;

/// One timed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub operation: String,
    pub processing_time_secs: f64,
    /// Resident set size in megabytes, sampled after the operation. Zero
    /// when the process could not be inspected.
    pub memory_usage_mb: f64,
}

/// Run `f`, returning its result together with a timing sample.
pub fn track_performance<T, F: FnOnce() -> T>(operation: &str, f: F) -> (T, PerformanceSample) {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed().as_secs_f64();

    let sample = PerformanceSample {
        operation: operation.to_string(),
        processing_time_secs: elapsed,
        memory_usage_mb: current_rss_mb(),
    };
    debug!(
        operation,
        secs = sample.processing_time_secs,
        rss_mb = sample.memory_usage_mb,
        "operation timed"
    );
    (result, sample)
}

fn current_rss_mb() -> f64 {
    let Ok(pid) = get_current_pid() else {
        return 0.0;
    };
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    sys.process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

/// Append-only collection of samples for the run.
#[derive(Debug, Default)]
pub struct PerformanceLog {
    samples: Vec<PerformanceSample>,
}

impl PerformanceLog {
    pub fn record(&mut self, sample: PerformanceSample) {
        self.samples.push(sample);
    }

    pub fn summary(&self, stats: VectorStoreStats) -> PerformanceSummary {
        let n = self.samples.len();
        let total: f64 = self.samples.iter().map(|s| s.processing_time_secs).sum();
        let avg_mem = if n == 0 {
            0.0
        } else {
            self.samples.iter().map(|s| s.memory_usage_mb).sum::<f64>() / n as f64
        };
        let peak_mem = self
            .samples
            .iter()
            .map(|s| s.memory_usage_mb)
            .fold(0.0, f64::max);

        PerformanceSummary {
            total_processing_time: total,
            average_time_per_operation: if n == 0 { 0.0 } else { total / n as f64 },
            memory_usage: UsageRange {
                average_mb: avg_mem,
                peak_mb: peak_mem,
            },
            // No GPU path; reported as zero for a stable report shape.
            gpu_usage: UsageRange::default(),
            total_operations: n,
            device_used: "cpu".to_string(),
            vector_store_stats: stats,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageRange {
    pub average_mb: f64,
    pub peak_mb: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VectorStoreStats {
    pub indexed_documents: usize,
    pub embedding_dimensions: usize,
}

/// Aggregated run statistics written into the metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_processing_time: f64,
    pub average_time_per_operation: f64,
    pub memory_usage: UsageRange,
    pub gpu_usage: UsageRange,
    pub total_operations: usize,
    pub device_used: String,
    pub vector_store_stats: VectorStoreStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_operation_returns_its_value() {
        let (value, sample) = track_performance("add", || 2 + 2);
        assert_eq!(value, 4);
        assert_eq!(sample.operation, "add");
        assert!(sample.processing_time_secs >= 0.0);
    }

    #[test]
    fn summary_aggregates_samples() {
        let mut log = PerformanceLog::default();
        log.record(PerformanceSample {
            operation: "a".into(),
            processing_time_secs: 1.0,
            memory_usage_mb: 100.0,
        });
        log.record(PerformanceSample {
            operation: "b".into(),
            processing_time_secs: 3.0,
            memory_usage_mb: 200.0,
        });

        let summary = log.summary(VectorStoreStats {
            indexed_documents: 25,
            embedding_dimensions: 768,
        });
        assert_eq!(summary.total_processing_time, 4.0);
        assert_eq!(summary.average_time_per_operation, 2.0);
        assert_eq!(summary.memory_usage.average_mb, 150.0);
        assert_eq!(summary.memory_usage.peak_mb, 200.0);
        assert_eq!(summary.gpu_usage.peak_mb, 0.0);
        assert_eq!(summary.total_operations, 2);
        assert_eq!(summary.vector_store_stats.indexed_documents, 25);
        assert_eq!(summary.device_used, "cpu");
    }

    #[test]
    fn empty_log_summary_is_zeroed() {
        let summary = PerformanceLog::default().summary(VectorStoreStats::default());
        assert_eq!(summary.total_processing_time, 0.0);
        assert_eq!(summary.average_time_per_operation, 0.0);
        assert_eq!(summary.total_operations, 0);
    }
}
