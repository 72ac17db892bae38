//! Committed event metric state and its text exposition.
//!
//! A [`MetricState`] is built complete off-lock and swapped into the
//! [`MetricStore`] in one step, so a scrape sees either the previous poll's
//! samples or the new ones, never a mix.

use crate::constants::{
    DOCUMENT_INCARNATION_HELP, DOCUMENT_INCARNATION_METRIC, EVENT_HELP, EVENT_METRIC,
    LABEL_EVENT_ID, LABEL_EVENT_STATUS, LABEL_EVENT_TYPE, LABEL_NOT_BEFORE, LABEL_RESOURCE,
    LABEL_RESOURCE_TYPE,
};
use crate::types::Event;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Full label tuple of one `scheduledevent_event` sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventLabels {
    pub event_id: String,
    pub event_type: String,
    pub resource_type: String,
    pub resource: String,
    pub event_status: String,
    pub not_before: String,
}

impl EventLabels {
    pub fn for_resource(event: &Event, resource: &str) -> Self {
        Self {
            event_id: event.event_id.clone(),
            event_type: event.event_type.clone(),
            resource_type: event.resource_type.clone(),
            resource: resource.to_string(),
            event_status: event.event_status.clone(),
            not_before: event.not_before.clone(),
        }
    }

    fn pairs(&self) -> [(&'static str, &str); 6] {
        [
            (LABEL_EVENT_ID, self.event_id.as_str()),
            (LABEL_EVENT_TYPE, self.event_type.as_str()),
            (LABEL_RESOURCE_TYPE, self.resource_type.as_str()),
            (LABEL_RESOURCE, self.resource.as_str()),
            (LABEL_EVENT_STATUS, self.event_status.as_str()),
            (LABEL_NOT_BEFORE, self.not_before.as_str()),
        ]
    }
}

/// The published gauge samples derived from one snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricState {
    events: BTreeMap<EventLabels, f64>,
    document_incarnation: Option<i64>,
}

impl MetricState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one event sample; an identical label tuple keeps the last value.
    pub fn set_event(&mut self, labels: EventLabels, value: f64) {
        self.events.insert(labels, value);
    }

    pub fn set_document_incarnation(&mut self, incarnation: i64) {
        self.document_incarnation = Some(incarnation);
    }

    pub fn document_incarnation(&self) -> Option<i64> {
        self.document_incarnation
    }

    pub fn value(&self, labels: &EventLabels) -> Option<f64> {
        self.events.get(labels).copied()
    }

    pub fn samples(&self) -> impl Iterator<Item = (&EventLabels, f64)> {
        self.events.iter().map(|(labels, value)| (labels, *value))
    }

    /// Samples carrying the given event id.
    pub fn samples_for_event<'a>(
        &'a self,
        event_id: &'a str,
    ) -> impl Iterator<Item = (&'a EventLabels, f64)> + 'a {
        self.samples().filter(move |(labels, _)| labels.event_id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl fmt::Display for MetricState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(incarnation) = self.document_incarnation {
            writeln!(f, "# HELP {} {}", DOCUMENT_INCARNATION_METRIC, DOCUMENT_INCARNATION_HELP)?;
            writeln!(f, "# TYPE {} gauge", DOCUMENT_INCARNATION_METRIC)?;
            writeln!(f, "{} {}", DOCUMENT_INCARNATION_METRIC, incarnation)?;
        }

        if self.events.is_empty() {
            return Ok(());
        }

        writeln!(f, "# HELP {} {}", EVENT_METRIC, EVENT_HELP)?;
        writeln!(f, "# TYPE {} gauge", EVENT_METRIC)?;
        for (labels, value) in &self.events {
            write!(f, "{}{{", EVENT_METRIC)?;
            for (i, (name, val)) in labels.pairs().iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}=\"{}\"", name, escape_label_value(val))?;
            }
            writeln!(f, "}} {}", value)?;
        }
        Ok(())
    }
}

/// Escape a label value for the text exposition format.
pub fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

struct Committed {
    generation: u64,
    state: Arc<MetricState>,
}

/// Holder of the latest committed [`MetricState`], shared between the poll
/// cycles (writers) and the scrape endpoint (reader).
pub struct MetricStore {
    inner: RwLock<Committed>,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Committed {
                generation: 0,
                state: Arc::new(MetricState::new()),
            }),
        }
    }

    /// The latest committed state. Readers hold only an `Arc`, never the lock.
    pub fn current(&self) -> Arc<MetricState> {
        self.inner.read().state.clone()
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Replace the committed state if `generation` is newer than the one
    /// currently committed. Returns whether the state was replaced.
    pub fn commit(&self, generation: u64, state: MetricState) -> bool {
        let mut inner = self.inner.write();
        if generation <= inner.generation {
            return false;
        }
        inner.generation = generation;
        inner.state = Arc::new(state);
        true
    }
}
