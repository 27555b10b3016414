//! In-process metrics
//!
//! Counters, gauges and a bounded histogram. Every metric reports itself as
//! a flat list of [`MetricSample`]s so a service can log them on a schedule.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Histograms keep at most this many observations by default
const DEFAULT_HISTOGRAM_SAMPLES: usize = 4_096;

/// One named value read from a metric
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

impl MetricSample {
    fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Anything that can be read out as named samples
pub trait Metric {
    fn name(&self) -> &str;
    fn samples(&self) -> Vec<MetricSample>;
}

/// Monotonic count shared between clones
#[derive(Debug, Clone)]
pub struct Counter {
    name: Arc<str>,
    total: Arc<AtomicU64>,
}

impl Counter {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            total: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, n: u64) {
        self.total.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl Metric for Counter {
    fn name(&self) -> &str {
        &self.name
    }

    fn samples(&self) -> Vec<MetricSample> {
        vec![MetricSample::new(&*self.name, self.get() as f64)]
    }
}

/// Last value written wins
#[derive(Debug, Clone)]
pub struct Gauge {
    name: Arc<str>,
    current: Arc<AtomicU64>,
}

impl Gauge {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            current: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn set(&self, value: u64) {
        self.current.store(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.current.load(Ordering::Relaxed)
    }
}

impl Metric for Gauge {
    fn name(&self) -> &str {
        &self.name
    }

    fn samples(&self) -> Vec<MetricSample> {
        vec![MetricSample::new(&*self.name, self.get() as f64)]
    }
}

/// Count, mean and tail quantiles over the retained observations
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HistogramSummary {
    pub count: usize,
    pub mean: f64,
    pub p50: f64,
    pub p99: f64,
}

/// Observations over a bounded horizon; the oldest are evicted first
#[derive(Debug, Clone)]
pub struct Histogram {
    name: Arc<str>,
    observations: Arc<Mutex<VecDeque<f64>>>,
    capacity: usize,
}

impl Histogram {
    pub fn new(name: &str) -> Self {
        Self::with_capacity(name, DEFAULT_HISTOGRAM_SAMPLES)
    }

    pub fn with_capacity(name: &str, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            name: Arc::from(name),
            observations: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn record(&self, value: f64) {
        let mut observations = self.observations.lock();
        if observations.len() == self.capacity {
            observations.pop_front();
        }
        observations.push_back(value);
    }

    pub fn summary(&self) -> HistogramSummary {
        let mut sorted: Vec<f64> = self.observations.lock().iter().copied().collect();
        if sorted.is_empty() {
            return HistogramSummary::default();
        }
        sorted.sort_by(f64::total_cmp);

        HistogramSummary {
            count: sorted.len(),
            mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
            p50: nearest_rank(&sorted, 0.50),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

impl Metric for Histogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn samples(&self) -> Vec<MetricSample> {
        let summary = self.summary();
        vec![
            MetricSample::new(format!("{}_count", self.name), summary.count as f64),
            MetricSample::new(format!("{}_mean", self.name), summary.mean),
            MetricSample::new(format!("{}_p50", self.name), summary.p50),
            MetricSample::new(format!("{}_p99", self.name), summary.p99),
        ]
    }
}

/// `sorted` must be non-empty and ascending
fn nearest_rank(sorted: &[f64], quantile: f64) -> f64 {
    let rank = (quantile * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_shared_between_clones() {
        let evaluations = Counter::new("evaluations_total");
        let handle = evaluations.clone();
        handle.inc();
        evaluations.add(4);

        assert_eq!(evaluations.get(), 5);
        assert_eq!(handle.samples(), vec![MetricSample::new("evaluations_total", 5.0)]);
    }

    #[test]
    fn test_gauge_keeps_last_value() {
        let gauge = Gauge::new("known_patients");
        gauge.set(10);
        gauge.set(3);
        assert_eq!(gauge.get(), 3);
        assert_eq!(gauge.name(), "known_patients");
    }

    #[test]
    fn test_histogram_summary() {
        let latency = Histogram::new("latency_ms");
        for v in [5.0, 1.0, 4.0, 2.0, 3.0] {
            latency.record(v);
        }

        let summary = latency.summary();
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-9);
        assert_eq!(summary.p50, 3.0);
        assert_eq!(summary.p99, 5.0);
    }

    #[test]
    fn test_empty_histogram_summary_is_zeroed() {
        assert_eq!(Histogram::new("idle").summary(), HistogramSummary::default());
    }

    #[test]
    fn test_histogram_evicts_oldest() {
        let latency = Histogram::with_capacity("bounded", 3);
        for v in [100.0, 1.0, 2.0, 3.0] {
            latency.record(v);
        }
        let summary = latency.summary();
        assert_eq!(summary.count, 3);
        assert!((summary.mean - 2.0).abs() < 1e-9);
        assert_eq!(summary.p99, 3.0);
    }

    #[test]
    fn test_histogram_samples_are_suffixed() {
        let latency = Histogram::new("latency_ms");
        latency.record(7.0);
        let names: Vec<String> = latency.samples().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["latency_ms_count", "latency_ms_mean", "latency_ms_p50", "latency_ms_p99"]
        );
    }
}
