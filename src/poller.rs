//! Timer-driven dispatch of poll cycles.

use crate::collector::Collector;
use crate::error::ExporterError;
use crate::metrics::CycleMetrics;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Runs a cycle immediately and then once per period. Each cycle is spawned
/// as its own task so a slow fetch never holds up the timer.
pub struct PollLoop {
    collector: Arc<Collector>,
    period: Duration,
    in_flight: Arc<AtomicUsize>,
}

impl PollLoop {
    pub fn new(collector: Arc<Collector>, period: Duration) -> Self {
        Self {
            collector,
            period,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Poll until a cycle escalates, and return that cycle's error.
    pub async fn run(self) -> ExporterError {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(period = ?self.period, "Starting scheduled event polling");

        loop {
            tokio::select! {
                biased;
                Some(err) = rx.recv() => {
                    error!("Stopping poll loop: {}", err);
                    return err;
                }
                _ = ticker.tick() => self.dispatch(&tx),
            }
        }
    }

    fn dispatch(&self, tx: &mpsc::UnboundedSender<ExporterError>) {
        let generation = self.collector.next_generation();
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst);
        if running > 0 {
            warn!(generation, running, "Previous poll cycle still running");
            CycleMetrics::record_overlap();
        }

        let collector = self.collector.clone();
        let in_flight = self.in_flight.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = collector.run_cycle_as(generation).await;
            in_flight.fetch_sub(1, Ordering::SeqCst);
            if let Err(err) = result {
                let _ = tx.send(err);
            }
        });
    }
}
