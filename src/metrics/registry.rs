//! Registration of self-instrumentation metrics
//!
//! Describes every metric to the installed recorder and checks that none of
//! them collides with the event families served from the metric store.

use crate::constants::{DOCUMENT_INCARNATION_METRIC, EVENT_METRIC};
use crate::metrics::{CycleMetrics, MetricDoc, MetricType};
use std::collections::HashMap;
use tracing::{info, warn};

pub fn register_all_metrics() {
    let docs = CycleMetrics::metrics_documentation();

    for conflict in find_conflicts(&docs) {
        warn!("Metric name conflict detected: '{}'", conflict);
    }

    CycleMetrics::register_metrics();
    for doc in &docs {
        describe(doc);
    }

    info!("Registered {} exporter metrics", docs.len());
}

fn describe(doc: &MetricDoc) {
    match doc.metric_type {
        MetricType::Counter => ::metrics::describe_counter!(doc.name, doc.help),
        MetricType::Histogram => ::metrics::describe_histogram!(doc.name, doc.help),
        MetricType::Gauge => ::metrics::describe_gauge!(doc.name, doc.help),
    }
}

/// Names defined twice, or shadowing an event family.
fn find_conflicts(docs: &[MetricDoc]) -> Vec<&'static str> {
    let mut seen: HashMap<&'static str, usize> = HashMap::new();
    seen.insert(DOCUMENT_INCARNATION_METRIC, 1);
    seen.insert(EVENT_METRIC, 1);

    let mut conflicts = Vec::new();
    for doc in docs {
        let count = seen.entry(doc.name).or_insert(0);
        *count += 1;
        if *count == 2 {
            conflicts.push(doc.name);
        }
    }
    conflicts
}
