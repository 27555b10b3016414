//! Per-patient Record Store
//!
//! Append-only time series of readings keyed by patient:
//! - Lock-sharded patient index via DashMap
//! - One short-lived RwLock critical section per append or query
//! - Queries return sorted snapshots

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;
use vitals_core::{PatientId, Reading, RecordType, TimestampMs, ValidationError};

/// Readings for one patient in insertion order
#[derive(Debug, Default)]
pub struct PatientSeries {
    readings: RwLock<Vec<Reading>>,
}

impl PatientSeries {
    fn push(&self, reading: Reading) {
        self.readings.write().push(reading);
    }

    /// Copy out the readings in `[start, end]`; the lock is released before sorting
    fn snapshot(&self, start: TimestampMs, end: TimestampMs) -> Vec<Reading> {
        let mut selected: Vec<Reading> = {
            let readings = self.readings.read();
            readings
                .iter()
                .filter(|r| r.timestamp >= start && r.timestamp <= end)
                .copied()
                .collect()
        };
        selected.sort_by_key(|r| r.timestamp);
        selected
    }

    fn len(&self) -> usize {
        self.readings.read().len()
    }
}

/// Thread-safe store shared between ingestion and evaluation
#[derive(Debug, Default)]
pub struct RecordStore {
    series: DashMap<PatientId, Arc<PatientSeries>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reading, creating the patient's series on first use
    pub fn append(
        &self,
        patient_id: PatientId,
        value: f64,
        record_type: RecordType,
        timestamp: TimestampMs,
    ) -> Result<(), ValidationError> {
        let reading = Reading::new(patient_id, value, record_type, timestamp)?;
        self.series_for(patient_id).push(reading);
        Ok(())
    }

    /// Append using an upstream record label such as `"SystolicPressure"`
    pub fn append_labeled(
        &self,
        patient_id: PatientId,
        value: f64,
        label: &str,
        timestamp: TimestampMs,
    ) -> Result<(), ValidationError> {
        let record_type: RecordType = label.parse()?;
        self.append(patient_id, value, record_type, timestamp)
    }

    /// Readings with `start <= timestamp <= end`, ascending by timestamp.
    ///
    /// Unknown patients and inverted ranges yield an empty vector.
    pub fn query(&self, patient_id: PatientId, start: TimestampMs, end: TimestampMs) -> Vec<Reading> {
        if start > end {
            return Vec::new();
        }
        // Clone the Arc so the shard lock is not held while copying readings
        let series = match self.series.get(&patient_id) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                debug!(patient_id = %patient_id, "Query for unknown patient");
                return Vec::new();
            }
        };
        series.snapshot(start, end)
    }

    /// Every patient with at least one stored reading
    pub fn patients(&self) -> BTreeSet<PatientId> {
        self.series.iter().map(|entry| *entry.key()).collect()
    }

    /// Number of readings stored for one patient
    pub fn len(&self, patient_id: PatientId) -> usize {
        self.series
            .get(&patient_id)
            .map(|entry| Arc::clone(entry.value()))
            .map_or(0, |series| series.len())
    }

    pub fn total_readings(&self) -> usize {
        let all: Vec<Arc<PatientSeries>> =
            self.series.iter().map(|entry| Arc::clone(entry.value())).collect();
        all.iter().map(|series| series.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    fn series_for(&self, patient_id: PatientId) -> Arc<PatientSeries> {
        if let Some(entry) = self.series.get(&patient_id) {
            return Arc::clone(entry.value());
        }
        let entry = self
            .series
            .entry(patient_id)
            .or_insert_with(|| Arc::new(PatientSeries::default()));
        Arc::clone(entry.value())
    }
}
