use tracing::debug;
use vitals_core::{Alert, Condition, PatientId, Reading, RecordType};

use super::sliding::SlidingWindow;
use super::{chronological, AlertRule, Result};
use crate::window::Window;

const BRADYCARDIA_BELOW: f64 = 60.0;
const TACHYCARDIA_ABOVE: f64 = 100.0;

/// Readings considered by the rhythm check (yielding one fewer interval)
const RHYTHM_READINGS: usize = 5;
const IRREGULARITY_RATIO: f64 = 0.2;

const PEAK_TRAILING_SAMPLES: usize = 10;
const PEAK_FACTOR: f64 = 2.0;

/// Rate thresholds, rhythm irregularity and abnormal ECG peaks
#[derive(Debug, Clone, Copy, Default)]
pub struct HeartRhythmRule;

impl AlertRule for HeartRhythmRule {
    fn name(&self) -> &'static str {
        "heart_rhythm"
    }

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>> {
        let series = chronological(window, RecordType::Ecg)?;
        let mut alerts: Vec<Alert> = series
            .iter()
            .filter_map(|r| rate_condition(r.value).map(|c| Alert::new(patient_id, c, r.timestamp)))
            .collect();

        if let Some(timestamp) = irregular_rhythm(&series) {
            alerts.push(Alert::new(patient_id, Condition::IrregularRhythm, timestamp));
        }
        if let Some(timestamp) = abnormal_peak(&series) {
            alerts.push(Alert::new(patient_id, Condition::EcgAbnormalPeak, timestamp));
        }

        Ok(alerts)
    }
}

fn rate_condition(value: f64) -> Option<Condition> {
    if value < BRADYCARDIA_BELOW {
        Some(Condition::Bradycardia)
    } else if value > TACHYCARDIA_ABOVE {
        Some(Condition::Tachycardia)
    } else {
        None
    }
}

/// Checks the intervals between the most recent readings; returns the last
/// reading's timestamp when any interval strays from their mean.
fn irregular_rhythm(series: &[Reading]) -> Option<i64> {
    if series.len() < RHYTHM_READINGS {
        return None;
    }

    let mut intervals = SlidingWindow::new(RHYTHM_READINGS - 1);
    for pair in series.windows(2) {
        intervals.push((pair[1].timestamp - pair[0].timestamp) as f64);
    }

    let mean = intervals.mean()?;
    // All readings share a timestamp: no rhythm to judge
    if mean <= 0.0 {
        return None;
    }
    let irregular = intervals
        .iter()
        .any(|interval| (interval - mean).abs() / mean >= IRREGULARITY_RATIO);

    let last = series.last()?;
    if irregular {
        debug!(mean_interval_ms = mean, timestamp = last.timestamp, "Irregular rhythm detected");
        Some(last.timestamp)
    } else {
        None
    }
}

/// First reading exceeding `PEAK_FACTOR` times the average of the preceding
/// `PEAK_TRAILING_SAMPLES` readings.
fn abnormal_peak(series: &[Reading]) -> Option<i64> {
    let mut trailing = SlidingWindow::new(PEAK_TRAILING_SAMPLES);
    for reading in series {
        if trailing.is_full() {
            let average = trailing.sum() / PEAK_TRAILING_SAMPLES as f64;
            if reading.value > average * PEAK_FACTOR {
                return Some(reading.timestamp);
            }
        }
        trailing.push(reading.value);
    }
    None
}
