//! Turns a snapshot into event samples and commits them to the store.

use crate::constants::{VALUE_BAD_TIMESTAMP, VALUE_NO_TIMESTAMP};
use crate::metrics::{CycleMetrics, EventLabels, MetricState, MetricStore};
use crate::timestamp::parse_unix_seconds;
use crate::types::{Event, Snapshot};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The snapshot's samples replaced the committed state.
    Committed { samples: usize },
    /// A newer cycle already committed; this snapshot was dropped.
    Superseded,
}

pub struct MetricPublisher {
    store: Arc<MetricStore>,
}

impl MetricPublisher {
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Replace the published samples with those of `snapshot`.
    pub fn publish(&self, generation: u64, snapshot: &Snapshot) -> PublishOutcome {
        let state = build_state(snapshot);
        let samples = state.len();

        if self.store.commit(generation, state) {
            debug!(
                generation,
                samples,
                incarnation = snapshot.document_incarnation,
                "Published scheduled event metrics"
            );
            PublishOutcome::Committed { samples }
        } else {
            debug!(generation, "Dropped snapshot from a superseded poll cycle");
            PublishOutcome::Superseded
        }
    }
}

/// Every sample derivable from `snapshot`, and nothing else.
pub fn build_state(snapshot: &Snapshot) -> MetricState {
    let mut state = MetricState::new();

    for event in &snapshot.events {
        let value = event_value(event);

        if event.resources.is_empty() {
            state.set_event(EventLabels::for_resource(event, ""), value);
        } else {
            for resource in &event.resources {
                state.set_event(EventLabels::for_resource(event, resource), value);
            }
        }
    }

    state.set_document_incarnation(snapshot.document_incarnation);
    state
}

/// Gauge value of an event: NotBefore as unix seconds, 1 when unset, 0 when
/// unparseable.
pub fn event_value(event: &Event) -> f64 {
    if event.not_before.is_empty() {
        return VALUE_NO_TIMESTAMP;
    }

    match parse_unix_seconds(&event.not_before) {
        Ok(seconds) => seconds as f64,
        Err(e) => {
            error!(
                event_id = %event.event_id,
                raw = %event.not_before,
                "Unable to parse time \"{}\" of eventid \"{}\": {}",
                event.not_before,
                event.event_id,
                e
            );
            CycleMetrics::record_timestamp_parse_error();
            VALUE_BAD_TIMESTAMP
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, resources: &[&str], not_before: &str) -> Event {
        Event {
            event_id: id.into(),
            event_type: "Reboot".into(),
            resource_type: "VirtualMachine".into(),
            resources: resources.iter().map(|r| r.to_string()).collect(),
            event_status: "Scheduled".into(),
            not_before: not_before.into(),
        }
    }

    fn snapshot(incarnation: i64, events: Vec<Event>) -> Snapshot {
        Snapshot {
            document_incarnation: incarnation,
            events,
        }
    }

    #[test]
    fn value_sentinels() {
        assert_eq!(event_value(&event("e1", &[], "")), 1.0);
        assert_eq!(
            event_value(&event("e1", &[], "2024-01-01T00:00:00Z")),
            1_704_067_200.0
        );
        assert_eq!(event_value(&event("e1", &[], "not-a-date")), 0.0);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn unparseable_timestamp_is_logged_with_event_id() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .finish();

        let value = tracing::subscriber::with_default(subscriber, || {
            event_value(&event("evt-42", &[], "not-a-date"))
        });

        let logs = String::from_utf8(captured.0.lock().clone()).unwrap();
        assert_eq!(value, 0.0);
        assert!(logs.contains("evt-42"));
        assert!(logs.contains("not-a-date"));
    }

    #[test]
    fn fans_out_one_sample_per_resource() {
        let e = event("e1", &["r1", "r2"], "");
        let state = build_state(&snapshot(1, vec![e.clone()]));

        let samples: Vec<_> = state.samples_for_event("e1").collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].0.resource, "r1");
        assert_eq!(samples[1].0.resource, "r2");
        assert_eq!(samples[0].1, samples[1].1);

        let mut r1 = samples[0].0.clone();
        r1.resource = "r2".into();
        assert_eq!(&r1, samples[1].0);
    }

    #[test]
    fn event_without_resources_gets_empty_resource_label() {
        let e = event("e1", &[], "");
        let state = build_state(&snapshot(1, vec![e.clone()]));

        assert_eq!(state.len(), 1);
        assert_eq!(state.value(&EventLabels::for_resource(&e, "")), Some(1.0));
    }

    #[test]
    fn empty_snapshot_still_sets_incarnation() {
        let state = build_state(&snapshot(9, vec![]));
        assert!(state.is_empty());
        assert_eq!(state.document_incarnation(), Some(9));
    }

    #[test]
    fn labels_carry_the_raw_not_before() {
        let e = event("e1", &["vm"], "not-a-date");
        let state = build_state(&snapshot(1, vec![e]));
        let (labels, value) = state.samples().next().unwrap();
        assert_eq!(labels.not_before, "not-a-date");
        assert_eq!(value, 0.0);
    }

    #[test]
    fn publish_removes_events_missing_from_latest_snapshot() {
        let publisher = MetricPublisher::new(Arc::new(MetricStore::new()));

        let a = snapshot(1, vec![event("E1", &["r1", "r2"], ""), event("E2", &[], "")]);
        assert_eq!(
            publisher.publish(1, &a),
            PublishOutcome::Committed { samples: 3 }
        );

        let b = snapshot(2, vec![event("E2", &[], "")]);
        assert_eq!(
            publisher.publish(2, &b),
            PublishOutcome::Committed { samples: 1 }
        );

        let current = publisher.store().current();
        assert_eq!(current.samples_for_event("E1").count(), 0);
        assert_eq!(current.samples_for_event("E2").count(), 1);
        assert_eq!(current.document_incarnation(), Some(2));
    }

    #[test]
    fn stale_generation_is_superseded() {
        let publisher = MetricPublisher::new(Arc::new(MetricStore::new()));
        publisher.publish(2, &snapshot(5, vec![event("new", &[], "")]));

        let outcome = publisher.publish(1, &snapshot(4, vec![event("old", &[], "")]));
        assert_eq!(outcome, PublishOutcome::Superseded);

        let current = publisher.store().current();
        assert_eq!(current.document_incarnation(), Some(5));
        assert_eq!(current.samples_for_event("old").count(), 0);
    }
}
