use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Metrics collection and management
///
/// Thin wrapper over the `metrics` facade; nothing is recorded unless the
/// embedding application installs a recorder.
#[derive(Debug, Clone, Copy)]
pub struct MetricsCollector {
    // Input metrics
    pub rows_read_total: &'static str,
    pub rows_loaded_total: &'static str,
    pub rows_dropped_total: &'static str,

    // Aggregation metrics
    pub aggregations_total: &'static str,
    pub aggregation_duration: &'static str,

    // Error metrics
    pub errors_total: &'static str,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self {
            rows_read_total: "chat_stats_rows_read_total",
            rows_loaded_total: "chat_stats_rows_loaded_total",
            rows_dropped_total: "chat_stats_rows_dropped_total",

            aggregations_total: "chat_stats_aggregations_total",
            aggregation_duration: "chat_stats_aggregation_duration_seconds",

            errors_total: "chat_stats_errors_total",
        }
    }
}

impl MetricsCollector {
    /// Record rows parsed from an export
    pub fn record_rows_read(&self, count: usize) {
        counter!(self.rows_read_total).increment(count as u64);
    }

    /// Record rows that made it into the canonical table
    pub fn record_rows_loaded(&self, count: usize) {
        counter!(self.rows_loaded_total).increment(count as u64);
    }

    /// Record rows removed while loading
    pub fn record_rows_dropped(&self, count: usize, reason: &'static str) {
        counter!(self.rows_dropped_total, "reason" => reason).increment(count as u64);
    }

    /// Record one aggregator run
    pub fn record_aggregation(&self, aggregator: &'static str, duration: Duration, success: bool) {
        let status = if success { "success" } else { "error" };
        counter!(self.aggregations_total, "aggregator" => aggregator, "status" => status).increment(1);
        histogram!(self.aggregation_duration, "aggregator" => aggregator).record(duration.as_secs_f64());

        if !success {
            self.record_error("aggregation", aggregator);
        }
    }

    /// Record error metrics
    pub fn record_error(&self, error_type: &'static str, operation: &'static str) {
        counter!(self.errors_total, "type" => error_type, "operation" => operation).increment(1);
    }
}

/// Performance timing wrapper for metrics
pub struct MetricsTimer {
    collector: MetricsCollector,
    aggregator: &'static str,
    start: Instant,
}

impl MetricsTimer {
    pub fn new(collector: MetricsCollector, aggregator: &'static str) -> Self {
        Self {
            collector,
            aggregator,
            start: Instant::now(),
        }
    }

    /// Stop the clock and record the run
    pub fn finish(self, success: bool) -> Duration {
        let duration = self.start.elapsed();
        self.collector.record_aggregation(self.aggregator, duration, success);
        tracing::debug!(
            aggregator = self.aggregator,
            duration_us = duration.as_micros() as u64,
            success,
            "Aggregation finished"
        );
        duration
    }
}

/// Time an aggregator call and record its outcome
pub fn timed<T, E>(aggregator: &'static str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
    let timer = MetricsTimer::new(MetricsCollector::default(), aggregator);
    let result = f();
    timer.finish(result.is_ok());
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::default();
        assert_eq!(collector.rows_read_total, "chat_stats_rows_read_total");
    }

    #[test]
    fn test_timed_passes_result_through() {
        let ok: Result<usize, String> = timed("test", || Ok(3));
        assert_eq!(ok, Ok(3));
        let err: Result<usize, String> = timed("test", || Err("boom".to_string()));
        assert!(err.is_err());
    }
}
