//! Poll cycle self-instrumentation
//!
//! Health of the exporter itself: fetch outcomes and latency, the current
//! consecutive failure count, timestamp parse failures and overlapping cycles.

use crate::metrics::{exporter_metric, MetricDoc, MetricType};
use std::time::Duration;

pub struct CycleMetrics;

impl CycleMetrics {
    pub fn record_fetch_success(duration: Duration) {
        ::metrics::counter!(exporter_metric!(counter, "fetch_success")).increment(1);
        Self::record_fetch_duration(duration);
    }

    pub fn record_fetch_failure(duration: Duration) {
        ::metrics::counter!(exporter_metric!(counter, "fetch_failure")).increment(1);
        Self::record_fetch_duration(duration);
    }

    fn record_fetch_duration(duration: Duration) {
        ::metrics::histogram!(exporter_metric!(histogram, "fetch_duration_seconds"))
            .record(duration.as_secs_f64());
    }

    pub fn set_consecutive_failures(failures: i64) {
        ::metrics::gauge!(exporter_metric!(gauge, "consecutive_failures")).set(failures as f64);
    }

    pub fn record_timestamp_parse_error() {
        ::metrics::counter!(exporter_metric!(counter, "timestamp_parse_errors")).increment(1);
    }

    pub fn record_overlap() {
        ::metrics::counter!(exporter_metric!(counter, "cycles_overlapped")).increment(1);
    }

    /// Touch every metric so it is exported before its first event.
    pub fn register_metrics() {
        use ::metrics::{counter, gauge, histogram};

        let _ = counter!(exporter_metric!(counter, "fetch_success"));
        let _ = counter!(exporter_metric!(counter, "fetch_failure"));
        let _ = counter!(exporter_metric!(counter, "timestamp_parse_errors"));
        let _ = counter!(exporter_metric!(counter, "cycles_overlapped"));
        let _ = histogram!(exporter_metric!(histogram, "fetch_duration_seconds"));
        let _ = gauge!(exporter_metric!(gauge, "consecutive_failures"));
    }

    pub fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: exporter_metric!(counter, "fetch_success"),
                metric_type: MetricType::Counter,
                help: "Total number of successful polls of the scheduled events endpoint",
            },
            MetricDoc {
                name: exporter_metric!(counter, "fetch_failure"),
                metric_type: MetricType::Counter,
                help: "Total number of failed polls (transport or decode errors)",
            },
            MetricDoc {
                name: exporter_metric!(histogram, "fetch_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of polls of the scheduled events endpoint in seconds",
            },
            MetricDoc {
                name: exporter_metric!(gauge, "consecutive_failures"),
                metric_type: MetricType::Gauge,
                help: "Failed polls since the last successful one",
            },
            MetricDoc {
                name: exporter_metric!(counter, "timestamp_parse_errors"),
                metric_type: MetricType::Counter,
                help: "Total number of event NotBefore values that could not be parsed",
            },
            MetricDoc {
                name: exporter_metric!(counter, "cycles_overlapped"),
                metric_type: MetricType::Counter,
                help: "Total number of poll cycles started while another was still running",
            },
        ]
    }
}
