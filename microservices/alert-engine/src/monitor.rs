//! Periodic evaluation loop over every known patient

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info};
use vitals_telemetry::{Gauge, Metric, MetricSample};

use crate::engine::EvaluationEngine;

/// Totals for one pass over all patients
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub patients: usize,
    pub alerts: usize,
    pub rule_failures: usize,
}

pub struct Monitor {
    engine: Arc<EvaluationEngine>,
    interval: Duration,
    known_patients: Gauge,
}

impl Monitor {
    pub fn new(engine: Arc<EvaluationEngine>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            known_patients: Gauge::new("alert_engine_known_patients"),
        }
    }

    pub fn known_patients(&self) -> &Gauge {
        &self.known_patients
    }

    /// Engine counters and latency, followed by the patient gauge
    pub fn metric_samples(&self) -> Vec<MetricSample> {
        let mut samples = self.engine.metrics().samples();
        samples.extend(self.known_patients.samples());
        samples
    }

    fn log_metrics(&self) {
        for sample in self.metric_samples() {
            info!(metric = %sample.name, value = sample.value, "Engine metric");
        }
    }

    /// Evaluate every patient once
    pub fn tick(&self) -> CycleStats {
        let summaries = self.engine.evaluate_all();
        self.known_patients.set(summaries.len() as u64);

        summaries.iter().fold(
            CycleStats {
                patients: summaries.len(),
                ..CycleStats::default()
            },
            |mut stats, s| {
                stats.alerts += s.alerts_delivered;
                stats.rule_failures += s.rule_failures;
                stats
            },
        )
    }

    /// Tick on the configured interval until `shutdown` flips to true (or its sender drops).
    ///
    /// Returns the number of completed cycles.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut cycles = 0u64;

        info!(interval_ms = self.interval.as_millis() as u64, "Monitor loop started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = interval.tick() => {
                    let stats = self.tick();
                    cycles += 1;
                    debug!(
                        cycle = cycles,
                        patients = stats.patients,
                        alerts = stats.alerts,
                        rule_failures = stats.rule_failures,
                        "Evaluation cycle complete"
                    );
                    self.log_metrics();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!(cycles, "Monitor loop stopped");
        cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::sink::CollectingSink;
    use crate::store::RecordStore;
    use vitals_core::{PatientId, RecordType};

    const NOW: i64 = 1_700_000_000_000;

    fn monitor_with_flags(patients: i64) -> (Monitor, Arc<CollectingSink>) {
        let store = Arc::new(RecordStore::new());
        for id in 0..patients {
            store.append(PatientId(id), 1.0, RecordType::ManualAlert, NOW).unwrap();
        }
        let sink = Arc::new(CollectingSink::new());
        let engine = EvaluationEngine::new(store, sink.clone()).with_clock(Arc::new(FixedClock::new(NOW)));
        (Monitor::new(Arc::new(engine), Duration::from_millis(10)), sink)
    }

    #[test]
    fn test_tick_evaluates_every_patient() {
        let (monitor, sink) = monitor_with_flags(3);
        let stats = monitor.tick();
        assert_eq!(stats, CycleStats { patients: 3, alerts: 3, rule_failures: 0 });
        assert_eq!(sink.len(), 3);
        assert_eq!(monitor.known_patients().get(), 3);
    }

    #[test]
    fn test_metric_samples_after_tick() {
        let (monitor, _sink) = monitor_with_flags(2);
        monitor.tick();

        let samples = monitor.metric_samples();
        let value = |name: &str| samples.iter().find(|s| s.name == name).map(|s| s.value);
        assert_eq!(value("alert_engine_evaluations_total"), Some(2.0));
        assert_eq!(value("alert_engine_alerts_emitted_total"), Some(2.0));
        assert_eq!(value("alert_engine_evaluation_latency_ms_count"), Some(2.0));
        assert_eq!(value(monitor.known_patients().name()), Some(2.0));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (monitor, sink) = monitor_with_flags(1);
        let (tx, rx) = watch::channel(false);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            tx.send(true).unwrap();
        });
        let cycles = monitor.run(rx).await;
        stopper.await.unwrap();

        assert!(cycles >= 1);
        assert_eq!(sink.len() as u64, cycles);
    }

    #[tokio::test]
    async fn test_run_exits_immediately_when_already_shut_down() {
        let (monitor, sink) = monitor_with_flags(1);
        let (_tx, rx) = watch::channel(true);
        assert_eq!(monitor.run(rx).await, 0);
        assert!(sink.is_empty());
    }
}
