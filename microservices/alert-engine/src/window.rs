//! Read-only evaluation window over one patient's readings

use vitals_core::{PatientId, Reading, RecordType, TimestampMs};

use crate::store::RecordStore;

/// Time-bounded view `[start, end]` (inclusive) plus the instant it was taken
#[derive(Debug, Clone)]
pub struct Window {
    patient_id: PatientId,
    start: TimestampMs,
    end: TimestampMs,
    evaluated_at: TimestampMs,
    readings: Vec<Reading>,
}

impl Window {
    /// Build a window from arbitrary readings; readings outside `[start, end]` are dropped.
    ///
    /// The evaluation instant defaults to `end`.
    pub fn new(
        patient_id: PatientId,
        start: TimestampMs,
        end: TimestampMs,
        mut readings: Vec<Reading>,
    ) -> Self {
        readings.retain(|r| r.timestamp >= start && r.timestamp <= end);
        Self {
            patient_id,
            start,
            end,
            evaluated_at: end,
            readings,
        }
    }

    /// Snapshot the store for `[start, end]`
    pub fn from_store(
        store: &RecordStore,
        patient_id: PatientId,
        start: TimestampMs,
        end: TimestampMs,
    ) -> Self {
        Self {
            patient_id,
            start,
            end,
            evaluated_at: end,
            readings: store.query(patient_id, start, end),
        }
    }

    pub fn at(mut self, evaluated_at: TimestampMs) -> Self {
        self.evaluated_at = evaluated_at;
        self
    }

    pub fn patient_id(&self) -> PatientId {
        self.patient_id
    }

    pub fn start(&self) -> TimestampMs {
        self.start
    }

    pub fn end(&self) -> TimestampMs {
        self.end
    }

    /// "Now" for rules that measure staleness from evaluation time
    pub fn evaluated_at(&self) -> TimestampMs {
        self.evaluated_at
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    /// Readings of one type in their stored order
    pub fn of_type(&self, record_type: RecordType) -> impl Iterator<Item = &Reading> + '_ {
        self.readings.iter().filter(move |r| r.is(record_type))
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
