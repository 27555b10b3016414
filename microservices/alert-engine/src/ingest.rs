//! Text Ingestion
//!
//! Parses the two line formats upstream producers write and feeds the
//! resulting readings into a `RecordStore`:
//! - `Patient ID: 12, Timestamp: 1700000000000, Label: Saturation, Data: 97.0%`
//! - `12,1700000000000,Saturation,97.0`

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use vitals_core::{PatientId, RecordType, TimestampMs, ValidationError};

use crate::store::RecordStore;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Malformed line: {0}")]
    Malformed(String),

    #[error("Invalid reading: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// A reading tuple as delivered by an upstream source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestRecord {
    pub patient_id: PatientId,
    pub timestamp: TimestampMs,
    pub record_type: RecordType,
    pub value: f64,
}

/// Counts from one ingestion pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub files: usize,
    pub accepted: usize,
    pub rejected: usize,
}

/// Parse one line in either the labelled file format or the comma-separated stream format
pub fn parse_line(line: &str) -> Result<IngestRecord> {
    let line = line.trim();
    let fields = if line.starts_with("Patient ID:") {
        labelled_fields(line)
    } else {
        csv_fields(line)
    };
    let fields = fields.ok_or_else(|| IngestError::Malformed(line.to_string()))?;

    let [patient, timestamp, label, data] = fields;
    let patient_id = patient
        .parse::<i64>()
        .map(PatientId)
        .map_err(|_| IngestError::Malformed(line.to_string()))?;
    let timestamp = timestamp
        .parse::<TimestampMs>()
        .map_err(|_| IngestError::Malformed(line.to_string()))?;
    let record_type: RecordType = label.parse()?;
    let value = parse_value(record_type, data).ok_or_else(|| IngestError::Malformed(line.to_string()))?;

    Ok(IngestRecord {
        patient_id,
        timestamp,
        record_type,
        value,
    })
}

/// Parse a line and append it to the store
pub fn ingest_line(store: &RecordStore, line: &str) -> Result<()> {
    let record = parse_line(line)?;
    store.append(record.patient_id, record.value, record.record_type, record.timestamp)?;
    Ok(())
}

/// Ingest every line of a text blob, skipping blank and malformed lines
pub fn ingest_text(store: &RecordStore, text: &str) -> IngestSummary {
    let mut summary = IngestSummary::default();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        match ingest_line(store, line) {
            Ok(()) => summary.accepted += 1,
            Err(e) => {
                summary.rejected += 1;
                warn!(error = %e, "Skipping reading");
            }
        }
    }
    summary
}

/// Read every `*.txt` file in `dir` (sorted by name) into the store
pub async fn read_directory(dir: &Path, store: &RecordStore) -> Result<IngestSummary> {
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();

    let mut summary = IngestSummary::default();
    for path in files {
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| IngestError::Io {
                path: path.clone(),
                source,
            })?;
        let file_summary = ingest_text(store, &text);
        debug!(
            file = %path.display(),
            accepted = file_summary.accepted,
            rejected = file_summary.rejected,
            "File ingested"
        );
        summary.files += 1;
        summary.accepted += file_summary.accepted;
        summary.rejected += file_summary.rejected;
    }

    info!(
        dir = %dir.display(),
        files = summary.files,
        accepted = summary.accepted,
        rejected = summary.rejected,
        "Directory ingested"
    );
    Ok(summary)
}

fn labelled_fields(line: &str) -> Option<[&str; 4]> {
    let mut parts = line.split(", ");
    let patient = parts.next()?.strip_prefix("Patient ID:")?.trim();
    let timestamp = parts.next()?.strip_prefix("Timestamp:")?.trim();
    let label = parts.next()?.strip_prefix("Label:")?.trim();
    let data = parts.next()?.strip_prefix("Data:")?.trim();
    if parts.next().is_some() {
        return None;
    }
    Some([patient, timestamp, label, data])
}

fn csv_fields(line: &str) -> Option<[&str; 4]> {
    let mut parts = line.split(',').map(str::trim);
    let fields = [parts.next()?, parts.next()?, parts.next()?, parts.next()?];
    if parts.next().is_some() {
        return None;
    }
    Some(fields)
}

/// Numeric value, tolerating a trailing `%` and the manual-flag words
fn parse_value(record_type: RecordType, raw: &str) -> Option<f64> {
    if record_type == RecordType::ManualAlert {
        match raw {
            "triggered" => return Some(1.0),
            "resolved" => return Some(0.0),
            _ => {}
        }
    }
    raw.trim_end_matches('%').trim().parse().ok()
}
