//! Evaluation Engine
//!
//! Pulls a patient's recent window from the store, runs every rule over the
//! same window in a fixed order and forwards the resulting alerts to a sink.
//! A failing rule is logged and skipped; it never suppresses the others.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};
use vitals_core::{Alert, PatientId, TimestampMs, DAY_MS};
use vitals_telemetry::{Counter, Histogram, Metric, MetricSample};

use crate::clock::{Clock, SystemClock};
use crate::rules::{default_rules, AlertRule, RuleError};
use crate::sink::AlertSink;
use crate::store::RecordStore;
use crate::window::Window;

/// A rule that failed during one evaluation
#[derive(Debug)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub error: RuleError,
}

/// Alerts and failures produced by running the rules over one window
#[derive(Debug, Default)]
pub struct EvaluationReport {
    pub alerts: Vec<Alert>,
    pub failures: Vec<RuleFailure>,
}

/// Outcome of one `evaluate_data` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub patient_id: PatientId,
    pub readings: usize,
    pub alerts_delivered: usize,
    pub rule_failures: usize,
    pub sink_failures: usize,
}

impl EvaluationSummary {
    fn empty(patient_id: PatientId) -> Self {
        Self {
            patient_id,
            readings: 0,
            alerts_delivered: 0,
            rule_failures: 0,
            sink_failures: 0,
        }
    }
}

#[derive(Clone)]
pub struct EngineMetrics {
    pub evaluations: Counter,
    pub alerts_emitted: Counter,
    pub rule_failures: Counter,
    pub sink_failures: Counter,
    pub evaluation_latency_ms: Histogram,
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self {
            evaluations: Counter::new("alert_engine_evaluations_total"),
            alerts_emitted: Counter::new("alert_engine_alerts_emitted_total"),
            rule_failures: Counter::new("alert_engine_rule_failures_total"),
            sink_failures: Counter::new("alert_engine_sink_failures_total"),
            evaluation_latency_ms: Histogram::new("alert_engine_evaluation_latency_ms"),
        }
    }
}

impl EngineMetrics {
    /// Counters first, then the latency summary
    pub fn samples(&self) -> Vec<MetricSample> {
        let counters = [
            &self.evaluations,
            &self.alerts_emitted,
            &self.rule_failures,
            &self.sink_failures,
        ];
        counters
            .into_iter()
            .flat_map(|counter| counter.samples())
            .chain(self.evaluation_latency_ms.samples())
            .collect()
    }
}

pub struct EvaluationEngine {
    store: Arc<RecordStore>,
    rules: Vec<Box<dyn AlertRule>>,
    sink: Arc<dyn AlertSink>,
    clock: Arc<dyn Clock>,
    lookback_ms: TimestampMs,
    metrics: EngineMetrics,
}

impl EvaluationEngine {
    /// Engine with the built-in rules, the system clock and a 24 hour lookback
    pub fn new(store: Arc<RecordStore>, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            store,
            rules: default_rules(),
            sink,
            clock: Arc::new(SystemClock),
            lookback_ms: DAY_MS,
            metrics: EngineMetrics::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_lookback(mut self, lookback_ms: TimestampMs) -> Self {
        self.lookback_ms = lookback_ms;
        self
    }

    /// Replace the rule list; rules run in the given order
    pub fn with_rules(mut self, rules: Vec<Box<dyn AlertRule>>) -> Self {
        self.rules = rules;
        self
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Evaluate the patient's last `lookback` of readings as of now
    pub fn evaluate_data(&self, patient_id: PatientId) -> EvaluationSummary {
        self.evaluate_data_at(patient_id, self.clock.now_ms())
    }

    /// Evaluate the window `[now - lookback, now]` and forward alerts to the sink
    pub fn evaluate_data_at(&self, patient_id: PatientId, now: TimestampMs) -> EvaluationSummary {
        let start = now.saturating_sub(self.lookback_ms);
        let window = Window::from_store(&self.store, patient_id, start, now);
        if window.is_empty() {
            debug!(patient_id = %patient_id, "No readings in window, skipping evaluation");
            return EvaluationSummary::empty(patient_id);
        }

        let started = Instant::now();
        self.metrics.evaluations.inc();

        let report = self.evaluate_window(&window);
        let mut summary = EvaluationSummary {
            patient_id,
            readings: window.len(),
            alerts_delivered: 0,
            rule_failures: report.failures.len(),
            sink_failures: 0,
        };

        for alert in report.alerts {
            match self.sink.deliver(alert) {
                Ok(()) => summary.alerts_delivered += 1,
                Err(e) => {
                    summary.sink_failures += 1;
                    self.metrics.sink_failures.inc();
                    warn!(patient_id = %patient_id, error = %e, "Alert delivery failed");
                }
            }
        }
        self.metrics.alerts_emitted.add(summary.alerts_delivered as u64);
        self.metrics
            .evaluation_latency_ms
            .record(started.elapsed().as_secs_f64() * 1_000.0);

        debug!(
            patient_id = %patient_id,
            readings = summary.readings,
            alerts = summary.alerts_delivered,
            rule_failures = summary.rule_failures,
            "Evaluation complete"
        );
        summary
    }

    /// Evaluate every patient known to the store against the same instant
    pub fn evaluate_all(&self) -> Vec<EvaluationSummary> {
        let now = self.clock.now_ms();
        self.store
            .patients()
            .into_iter()
            .map(|patient_id| self.evaluate_data_at(patient_id, now))
            .collect()
    }

    /// Run every rule over the window without touching the sink
    pub fn evaluate_window(&self, window: &Window) -> EvaluationReport {
        let patient_id = window.patient_id();
        let mut report = EvaluationReport::default();

        for rule in &self.rules {
            match run_guarded(rule.as_ref(), patient_id, window) {
                Ok(alerts) => {
                    debug!(rule = rule.name(), patient_id = %patient_id, count = alerts.len(), "Rule evaluated");
                    report.alerts.extend(alerts);
                }
                Err(error) => {
                    warn!(rule = rule.name(), patient_id = %patient_id, error = %error, "Rule evaluation failed");
                    self.metrics.rule_failures.inc();
                    report.failures.push(RuleFailure {
                        rule: rule.name(),
                        error,
                    });
                }
            }
        }
        report
    }
}

/// Evaluate one rule, turning a panic into a `RuleError`
fn run_guarded(
    rule: &dyn AlertRule,
    patient_id: PatientId,
    window: &Window,
) -> Result<Vec<Alert>, RuleError> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(patient_id, window))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(RuleError::Panicked(message))
        }
    }
}
