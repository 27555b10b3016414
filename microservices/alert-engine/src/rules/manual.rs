use vitals_core::{Alert, Condition, PatientId, RecordType};

use super::{chronological, AlertRule, Result};
use crate::window::Window;

/// Coalesces every manual flag in the window into a single alert at the earliest one
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualTriggerRule;

impl AlertRule for ManualTriggerRule {
    fn name(&self) -> &'static str {
        "manual_trigger"
    }

    fn evaluate(&self, patient_id: PatientId, window: &Window) -> Result<Vec<Alert>> {
        let flags = chronological(window, RecordType::ManualAlert)?;
        Ok(flags
            .first()
            .map(|flag| Alert::new(patient_id, Condition::ManualTrigger, flag.timestamp))
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_repeated_flags_coalesce() {
        let w = window(vec![
            reading(RecordType::ManualAlert, 1.0, T0 + 500),
            reading(RecordType::ManualAlert, 1.0, T0),
            reading(RecordType::ManualAlert, 0.0, T0 + 900),
        ]);
        let alerts = ManualTriggerRule.evaluate(PATIENT, &w).unwrap();
        assert_eq!(alerts, vec![Alert::new(PATIENT, Condition::ManualTrigger, T0)]);
    }

    #[test]
    fn test_no_flag_no_alert() {
        let w = window(vec![reading(RecordType::Saturation, 97.0, T0)]);
        assert!(ManualTriggerRule.evaluate(PATIENT, &w).unwrap().is_empty());
    }
}
