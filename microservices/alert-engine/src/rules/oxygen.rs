use vitals_core::{Alert, Condition, PatientId, RecordType, MINUTE_MS};

use super::{chronological, AlertRule, Result};
use crate::window::Window;

const LOW_SATURATION: f64 = 92.0;
const RAPID_DROP: f64 = 5.0;
const RAPID_DROP_WINDOW_MS: i64 = 10 * MINUTE_MS;

/// Low saturation threshold and rapid-drop detection, at most one alert of each
#[derive(Debug, Clone, Copy, Default)]
pub struct OxygenSaturationRule;

impl AlertRule for OxygenSaturationRule {
    fn name(&self) -> &'static str {
        "oxygen_saturation"
    }

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>> {
        let series = chronological(window, RecordType::Saturation)?;
        let mut alerts = Vec::new();

        if let Some(low) = series.iter().find(|r| r.value < LOW_SATURATION) {
            alerts.push(Alert::new(patient_id, Condition::LowSaturation, low.timestamp));
        }

        let rapid_drop = series.windows(2).find_map(|pair| {
            let (earlier, later) = (&pair[0], &pair[1]);
            let close = later.timestamp - earlier.timestamp <= RAPID_DROP_WINDOW_MS;
            (close && earlier.value - later.value >= RAPID_DROP).then_some(later.timestamp)
        });
        if let Some(timestamp) = rapid_drop {
            alerts.push(Alert::new(patient_id, Condition::RapidSaturationDrop, timestamp));
        }

        Ok(alerts)
    }
}
