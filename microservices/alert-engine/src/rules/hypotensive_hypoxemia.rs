use vitals_core::{Alert, Condition, PatientId, Reading, RecordType, TimestampMs, MINUTE_MS};

use super::{chronological, AlertRule, Result};
use crate::window::Window;

const SYSTOLIC_BELOW: f64 = 90.0;
const SATURATION_BELOW: f64 = 92.0;
/// Both signals must be this fresh relative to evaluation time, and this close to each other
const CORRELATION_WINDOW_MS: TimestampMs = 30 * MINUTE_MS;

/// Low systolic pressure together with low saturation
#[derive(Debug, Clone, Copy, Default)]
pub struct HypotensiveHypoxemiaRule;

impl AlertRule for HypotensiveHypoxemiaRule {
    fn name(&self) -> &'static str {
        "hypotensive_hypoxemia"
    }

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>> {
        let now = window.evaluated_at();
        let systolic = latest_recent(&chronological(window, RecordType::SystolicPressure)?, now);
        let saturation = latest_recent(&chronological(window, RecordType::Saturation)?, now);

        let (Some(systolic), Some(saturation)) = (systolic, saturation) else {
            return Ok(Vec::new());
        };

        let correlated = (systolic.timestamp - saturation.timestamp).abs() <= CORRELATION_WINDOW_MS;
        if correlated && systolic.value < SYSTOLIC_BELOW && saturation.value < SATURATION_BELOW {
            let timestamp = systolic.timestamp.max(saturation.timestamp);
            return Ok(vec![Alert::new(patient_id, Condition::HypotensiveHypoxemia, timestamp)]);
        }
        Ok(Vec::new())
    }
}

/// Most recent reading in `[now - CORRELATION_WINDOW_MS, now]`
fn latest_recent(series: &[Reading], now: TimestampMs) -> Option<Reading> {
    series
        .iter()
        .rev()
        .find(|r| r.timestamp <= now && now - r.timestamp <= CORRELATION_WINDOW_MS)
        .copied()
}
