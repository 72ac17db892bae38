//! One poll cycle: fetch, then publish or hand the failure to the governor.

use crate::error::{ExporterError, Result};
use crate::governor::{FailureGovernor, Verdict};
use crate::metrics::{CycleMetrics, MetricPublisher, MetricStore, PublishOutcome};
use crate::source::SnapshotSource;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Published { events: usize, samples: usize },
    /// Fetched fine, but a newer cycle had already published.
    Superseded,
    /// Fetch failed within tolerance; metrics left as they were.
    Tolerated { failures: i64 },
}

/// Owns everything a poll cycle mutates: the failure count, the publisher
/// and the generation counter ordering overlapping cycles.
pub struct Collector {
    source: Arc<dyn SnapshotSource>,
    governor: FailureGovernor,
    publisher: MetricPublisher,
    generation: AtomicU64,
}

impl Collector {
    pub fn new(source: Arc<dyn SnapshotSource>, threshold: i64, store: Arc<MetricStore>) -> Self {
        Self {
            source,
            governor: FailureGovernor::new(threshold),
            publisher: MetricPublisher::new(store),
            generation: AtomicU64::new(0),
        }
    }

    pub fn governor(&self) -> &FailureGovernor {
        &self.governor
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        self.publisher.store()
    }

    /// Reserve the generation for a cycle about to start.
    pub fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        let generation = self.next_generation();
        self.run_cycle_as(generation).await
    }

    /// Run a cycle under a previously reserved generation.
    ///
    /// Returns `Err(ExporterError::Escalated)` once the failure threshold is
    /// exceeded; every other outcome is `Ok`.
    pub async fn run_cycle_as(&self, generation: u64) -> Result<CycleOutcome> {
        let started = Instant::now();

        let snapshot = match self.source.fetch().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                CycleMetrics::record_fetch_failure(started.elapsed());
                return self.handle_failure(err);
            }
        };

        CycleMetrics::record_fetch_success(started.elapsed());
        self.governor.record_success();

        let events = snapshot.events.len();
        match self.publisher.publish(generation, &snapshot) {
            PublishOutcome::Committed { samples } => {
                debug!("Fetched {} scheduled events", events);
                Ok(CycleOutcome::Published { events, samples })
            }
            PublishOutcome::Superseded => Ok(CycleOutcome::Superseded),
        }
    }

    fn handle_failure(&self, err: ExporterError) -> Result<CycleOutcome> {
        match self.governor.record_failure() {
            Verdict::Tolerate { failures } => {
                error!(
                    failures,
                    threshold = self.governor.threshold(),
                    "Failed API call: {}",
                    err
                );
                Ok(CycleOutcome::Tolerated { failures })
            }
            Verdict::Escalate { failures } => {
                error!(
                    failures,
                    threshold = self.governor.threshold(),
                    "Failed API call, failure threshold exceeded: {}",
                    err
                );
                Err(ExporterError::Escalated {
                    failures,
                    source: Box::new(err),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Event, Snapshot};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Replays scripted fetch results; `None` entries become decode errors.
    struct Scripted(Mutex<VecDeque<Option<Snapshot>>>);

    impl Scripted {
        fn new(script: Vec<Option<Snapshot>>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(script.into())))
        }
    }

    #[async_trait]
    impl SnapshotSource for Scripted {
        async fn fetch(&self) -> Result<Snapshot> {
            match self.0.lock().pop_front().flatten() {
                Some(snapshot) => Ok(snapshot),
                None => Err(serde_json::from_str::<Snapshot>("not json").unwrap_err().into()),
            }
        }
    }

    fn snapshot(incarnation: i64, ids: &[&str]) -> Snapshot {
        Snapshot {
            document_incarnation: incarnation,
            events: ids
                .iter()
                .map(|id| Event {
                    event_id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn collector(script: Vec<Option<Snapshot>>, threshold: i64) -> Collector {
        Collector::new(Scripted::new(script), threshold, Arc::new(MetricStore::new()))
    }

    #[tokio::test]
    async fn success_publishes_and_resets_failures() {
        let c = collector(vec![None, None, Some(snapshot(3, &["e1", "e2"]))], 5);

        assert_eq!(c.run_cycle().await.unwrap(), CycleOutcome::Tolerated { failures: 1 });
        assert_eq!(c.run_cycle().await.unwrap(), CycleOutcome::Tolerated { failures: 2 });
        assert_eq!(
            c.run_cycle().await.unwrap(),
            CycleOutcome::Published { events: 2, samples: 2 }
        );
        assert_eq!(c.governor().consecutive_failures(), 0);
        assert_eq!(c.store().current().document_incarnation(), Some(3));
    }

    #[tokio::test]
    async fn tolerated_failure_keeps_previous_metrics() {
        let c = collector(vec![Some(snapshot(1, &["e1"])), None], 0);
        c.run_cycle().await.unwrap();
        let before = c.store().current();

        assert!(matches!(c.run_cycle().await.unwrap(), CycleOutcome::Tolerated { .. }));
        assert_eq!(*c.store().current(), *before);
        assert_eq!(c.store().current().document_incarnation(), Some(1));
    }

    #[tokio::test]
    async fn escalates_after_threshold_with_triggering_error() {
        let c = collector(vec![None, None, None], 2);
        c.run_cycle().await.unwrap();
        c.run_cycle().await.unwrap();

        match c.run_cycle().await {
            Err(ExporterError::Escalated { failures, source }) => {
                assert_eq!(failures, 3);
                assert!(matches!(*source, ExporterError::Decode(_)));
            }
            other => panic!("expected escalation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn late_cycle_does_not_roll_back_newer_publish() {
        let c = collector(vec![Some(snapshot(8, &["new"])), Some(snapshot(7, &["old"]))], 0);
        let older = c.next_generation();
        let newer = c.next_generation();

        assert!(matches!(
            c.run_cycle_as(newer).await.unwrap(),
            CycleOutcome::Published { .. }
        ));
        assert_eq!(c.run_cycle_as(older).await.unwrap(), CycleOutcome::Superseded);
        assert_eq!(c.store().current().document_incarnation(), Some(8));
    }
}
