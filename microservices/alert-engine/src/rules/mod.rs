//! Clinical Alert Rules
//!
//! Every rule is stateless: all temporal reasoning is re-derived from the
//! window on each call, so one instance can serve concurrent evaluations of
//! different patients.

mod blood_pressure;
mod heart_rhythm;
mod hypotensive_hypoxemia;
mod manual;
mod oxygen;
mod sliding;

pub use blood_pressure::BloodPressureRule;
pub use heart_rhythm::HeartRhythmRule;
pub use hypotensive_hypoxemia::HypotensiveHypoxemiaRule;
pub use manual::ManualTriggerRule;
pub use oxygen::OxygenSaturationRule;
pub use sliding::SlidingWindow;

use thiserror::Error;
use vitals_core::{Alert, PatientId, Reading, RecordType, TimestampMs};

use crate::window::Window;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("malformed {record_type} reading at {timestamp}: value {value}")]
    MalformedReading {
        record_type: RecordType,
        value: f64,
        timestamp: TimestampMs,
    },

    #[error("rule panicked: {0}")]
    Panicked(String),
}

pub type Result<T> = std::result::Result<T, RuleError>;

/// A clinical check mapping a window to zero or more alerts
pub trait AlertRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>>;
}

/// The built-in rules in evaluation order
pub fn default_rules() -> Vec<Box<dyn AlertRule>> {
    vec![
        Box::new(BloodPressureRule),
        Box::new(OxygenSaturationRule),
        Box::new(HeartRhythmRule),
        Box::new(HypotensiveHypoxemiaRule),
        Box::new(ManualTriggerRule),
    ]
}

/// Readings of one type sorted by timestamp (stable for equal timestamps).
///
/// Rules never trust storage order; non-finite values are reported rather than compared.
pub(crate) fn chronological(window: &Window, record_type: RecordType) -> Result<Vec<Reading>> {
    let mut series = Vec::new();
    for reading in window.of_type(record_type) {
        if !reading.value.is_finite() {
            return Err(RuleError::MalformedReading {
                record_type,
                value: reading.value,
                timestamp: reading.timestamp,
            });
        }
        series.push(*reading);
    }
    series.sort_by_key(|r| r.timestamp);
    Ok(series)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use vitals_core::Condition;

    pub const PATIENT: PatientId = PatientId(1001);
    pub const T0: TimestampMs = 1_700_000_000_000;

    pub fn reading(record_type: RecordType, value: f64, timestamp: TimestampMs) -> Reading {
        Reading {
            patient_id: PATIENT,
            value,
            record_type,
            timestamp,
        }
    }

    /// Window spanning every given reading, evaluated at its latest timestamp
    pub fn window(readings: Vec<Reading>) -> Window {
        let end = readings.iter().map(|r| r.timestamp).max().unwrap_or(T0);
        Window::new(PATIENT, i64::MIN, end, readings)
    }

    pub fn conditions(alerts: &[Alert]) -> Vec<Condition> {
        alerts.iter().map(|a| a.condition).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_default_rule_order() {
        let names: Vec<&str> = default_rules().iter().map(|r| r.name()).collect();
        assert_eq!(
            names,
            vec!["blood_pressure", "oxygen_saturation", "heart_rhythm", "hypotensive_hypoxemia", "manual_trigger"]
        );
    }

    #[test]
    fn test_chronological_sorts_and_filters() {
        let w = window(vec![
            reading(RecordType::Saturation, 95.0, T0 + 20),
            reading(RecordType::Ecg, 80.0, T0 + 5),
            reading(RecordType::Saturation, 97.0, T0 + 10),
        ]);
        let sats = chronological(&w, RecordType::Saturation).unwrap();
        assert_eq!(sats.iter().map(|r| r.timestamp).collect::<Vec<_>>(), vec![T0 + 10, T0 + 20]);
    }

    #[test]
    fn test_chronological_reports_nan() {
        let w = window(vec![reading(RecordType::Ecg, f64::NAN, T0)]);
        let err = chronological(&w, RecordType::Ecg).unwrap_err();
        assert!(matches!(err, RuleError::MalformedReading { record_type: RecordType::Ecg, .. }));
    }
}
