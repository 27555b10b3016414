//! Core domain types shared by ingestion, storage and alerting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Milliseconds since the Unix epoch
pub type TimestampMs = i64;

pub const SECOND_MS: TimestampMs = 1_000;
pub const MINUTE_MS: TimestampMs = 60 * SECOND_MS;
pub const HOUR_MS: TimestampMs = 60 * MINUTE_MS;
pub const DAY_MS: TimestampMs = 24 * HOUR_MS;

/// Patient identifier as assigned upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(pub i64);

impl PatientId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PatientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Kind of measurement carried by a reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    SystolicPressure,
    DiastolicPressure,
    Saturation,
    #[serde(rename = "ECG")]
    Ecg,
    /// Manual flag raised by staff or the patient
    #[serde(rename = "Alert")]
    ManualAlert,
}

impl RecordType {
    pub const ALL: [RecordType; 5] = [
        Self::SystolicPressure,
        Self::DiastolicPressure,
        Self::Saturation,
        Self::Ecg,
        Self::ManualAlert,
    ];

    /// Wire label used by upstream sources
    pub fn label(&self) -> &'static str {
        match self {
            Self::SystolicPressure => "SystolicPressure",
            Self::DiastolicPressure => "DiastolicPressure",
            Self::Saturation => "Saturation",
            Self::Ecg => "ECG",
            Self::ManualAlert => "Alert",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecordType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label() == s)
            .ok_or_else(|| ValidationError::UnknownRecordType(s.to_string()))
    }
}

/// A single timestamped measurement for one patient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub patient_id: PatientId,
    pub value: f64,
    pub record_type: RecordType,
    pub timestamp: TimestampMs,
}

impl Reading {
    /// Build a reading, rejecting NaN and infinite values
    pub fn new(
        patient_id: PatientId,
        value: f64,
        record_type: RecordType,
        timestamp: TimestampMs,
    ) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue(value));
        }
        Ok(Self {
            patient_id,
            value,
            record_type,
            timestamp,
        })
    }

    pub fn is(&self, record_type: RecordType) -> bool {
        self.record_type == record_type
    }
}

/// Clinical condition an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "Critical Systolic")]
    CriticalSystolic,
    #[serde(rename = "Critical Diastolic")]
    CriticalDiastolic,
    #[serde(rename = "Systolic Pressure Increasing")]
    SystolicIncreasing,
    #[serde(rename = "Systolic Pressure Decreasing")]
    SystolicDecreasing,
    #[serde(rename = "Diastolic Pressure Increasing")]
    DiastolicIncreasing,
    #[serde(rename = "Diastolic Pressure Decreasing")]
    DiastolicDecreasing,
    #[serde(rename = "Low Blood Saturation Alert")]
    LowSaturation,
    #[serde(rename = "Rapid Blood Saturation Drop Alert")]
    RapidSaturationDrop,
    #[serde(rename = "Bradycardia Alert")]
    Bradycardia,
    #[serde(rename = "Tachycardia Alert")]
    Tachycardia,
    #[serde(rename = "Irregular Rhythm Alert")]
    IrregularRhythm,
    #[serde(rename = "ECG Abnormal Peak Alert")]
    EcgAbnormalPeak,
    #[serde(rename = "Hypotensive Hypoxemia Alert")]
    HypotensiveHypoxemia,
    #[serde(rename = "Triggered Alert")]
    ManualTrigger,
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::CriticalSystolic => "Critical Systolic",
            Self::CriticalDiastolic => "Critical Diastolic",
            Self::SystolicIncreasing => "Systolic Pressure Increasing",
            Self::SystolicDecreasing => "Systolic Pressure Decreasing",
            Self::DiastolicIncreasing => "Diastolic Pressure Increasing",
            Self::DiastolicDecreasing => "Diastolic Pressure Decreasing",
            Self::LowSaturation => "Low Blood Saturation Alert",
            Self::RapidSaturationDrop => "Rapid Blood Saturation Drop Alert",
            Self::Bradycardia => "Bradycardia Alert",
            Self::Tachycardia => "Tachycardia Alert",
            Self::IrregularRhythm => "Irregular Rhythm Alert",
            Self::EcgAbnormalPeak => "ECG Abnormal Peak Alert",
            Self::HypotensiveHypoxemia => "Hypotensive Hypoxemia Alert",
            Self::ManualTrigger => "Triggered Alert",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finalized alert handed to a sink. Equality is field equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Alert {
    pub patient_id: String,
    pub condition: Condition,
    pub timestamp: TimestampMs,
}

impl Alert {
    pub fn new(patient_id: PatientId, condition: Condition, timestamp: TimestampMs) -> Self {
        Self {
            patient_id: patient_id.to_string(),
            condition,
            timestamp,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ALERT] Patient {} | Condition: {} | Timestamp: {}",
            self.patient_id, self.condition, self.timestamp
        )
    }
}
