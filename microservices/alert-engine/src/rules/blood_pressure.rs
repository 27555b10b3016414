use tracing::debug;
use vitals_core::{Alert, Condition, PatientId, Reading, RecordType, HOUR_MS};

use super::{chronological, AlertRule, Result};
use crate::window::Window;

const TREND_STEP: f64 = 10.0;
const TREND_MIN_GAP_MS: i64 = HOUR_MS;

/// Limits and alert labels for one pressure channel
struct Channel {
    record_type: RecordType,
    lower: f64,
    upper: f64,
    critical: Condition,
    increasing: Condition,
    decreasing: Condition,
}

const SYSTOLIC: Channel = Channel {
    record_type: RecordType::SystolicPressure,
    lower: 90.0,
    upper: 180.0,
    critical: Condition::CriticalSystolic,
    increasing: Condition::SystolicIncreasing,
    decreasing: Condition::SystolicDecreasing,
};

const DIASTOLIC: Channel = Channel {
    record_type: RecordType::DiastolicPressure,
    lower: 60.0,
    upper: 120.0,
    critical: Condition::CriticalDiastolic,
    increasing: Condition::DiastolicIncreasing,
    decreasing: Condition::DiastolicDecreasing,
};

/// Critical systolic/diastolic values and three-reading trends
#[derive(Debug, Clone, Copy, Default)]
pub struct BloodPressureRule;

impl AlertRule for BloodPressureRule {
    fn name(&self) -> &'static str {
        "blood_pressure"
    }

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>> {
        let systolic = chronological(window, SYSTOLIC.record_type)?;
        let diastolic = chronological(window, DIASTOLIC.record_type)?;

        let mut alerts = Vec::new();
        for (channel, series) in [(&SYSTOLIC, &systolic), (&DIASTOLIC, &diastolic)] {
            alerts.extend(
                series
                    .iter()
                    .filter(|r| r.value < channel.lower || r.value > channel.upper)
                    .map(|r| Alert::new(patient_id, channel.critical, r.timestamp)),
            );
        }
        for (channel, series) in [(&SYSTOLIC, &systolic), (&DIASTOLIC, &diastolic)] {
            if let Some(alert) = trend(patient_id, channel, series) {
                alerts.push(alert);
            }
        }
        Ok(alerts)
    }
}

/// Looks only at the three most recent readings of the channel
fn trend(patient_id: PatientId, channel: &Channel, series: &[Reading]) -> Option<Alert> {
    let [first, second, third] = series.get(series.len().checked_sub(3)?..)? else {
        return None;
    };

    if second.timestamp - first.timestamp < TREND_MIN_GAP_MS
        || third.timestamp - second.timestamp < TREND_MIN_GAP_MS
    {
        debug!(
            patient_id = %patient_id,
            record_type = %channel.record_type,
            "Trend readings too close together, skipping"
        );
        return None;
    }

    let rising = second.value - first.value >= TREND_STEP && third.value - second.value >= TREND_STEP;
    let falling = first.value - second.value >= TREND_STEP && second.value - third.value >= TREND_STEP;

    let condition = if rising {
        channel.increasing
    } else if falling {
        channel.decreasing
    } else {
        return None;
    };
    Some(Alert::new(patient_id, condition, third.timestamp))
}
