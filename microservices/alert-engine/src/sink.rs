//! Alert Sinks
//!
//! The engine hands every finalized alert to exactly one sink call; what the
//! sink does with it (log, notify, drop) is up to the implementation.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;
use vitals_core::Alert;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Sink rejected alert: {0}")]
    Rejected(String),
}

pub trait AlertSink: Send + Sync {
    fn deliver(&self, alert: Alert) -> Result<(), SinkError>;
}

/// Emits each alert as a structured log event
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn deliver(&self, alert: Alert) -> Result<(), SinkError> {
        let payload = serde_json::to_string(&alert)?;
        info!(
            patient_id = %alert.patient_id,
            condition = %alert.condition,
            timestamp = alert.timestamp,
            payload = %payload,
            "Alert raised"
        );
        Ok(())
    }
}

/// Keeps alerts in memory in delivery order
#[derive(Debug, Default)]
pub struct CollectingSink {
    alerts: Mutex<Vec<Alert>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    /// Take every collected alert, leaving the sink empty
    pub fn drain(&self) -> Vec<Alert> {
        std::mem::take(&mut *self.alerts.lock())
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

impl AlertSink for CollectingSink {
    fn deliver(&self, alert: Alert) -> Result<(), SinkError> {
        self.alerts.lock().push(alert);
        Ok(())
    }
}
