//! Metrics for the exporter.
//!
//! Two kinds live here:
//! - the event families (`scheduledevent_event`, `scheduledevent_document_incarnation`),
//!   rebuilt wholesale from each snapshot and held in a [`MetricStore`]
//! - self-instrumentation of the poll cycle, recorded through the `metrics`
//!   facade and rendered by a Prometheus recorder handle

pub mod cycle;
pub mod publisher;
pub mod registry;
pub mod state;

pub use cycle::CycleMetrics;
pub use publisher::{MetricPublisher, PublishOutcome};
pub use state::{EventLabels, MetricState, MetricStore};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder for self-instrumentation.
///
/// Idempotent. No listener is started; the scrape endpoint renders the
/// returned handle next to the event families. Returns `None` when another
/// recorder was already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    if let Some(handle) = HANDLE.get() {
        return Some(handle.clone());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let handle = HANDLE.get_or_init(|| handle).clone();
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

/// Documentation for a single self-instrumentation metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Build a self-instrumentation metric name:
/// `scheduledevent_{name}` with `_total` appended for counters.
macro_rules! exporter_metric {
    (counter, $name:literal) => {
        concat!("scheduledevent_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("scheduledevent_", $name)
    };
    (gauge, $name:literal) => {
        concat!("scheduledevent_", $name)
    };
}

pub(crate) use exporter_metric;
