//! Error types for vitals services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VitalsError>;

#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("Rule error: {0}")]
    Rule(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VitalsError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::Ingest(_) => 400,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Ingest(_) => "INGEST_ERROR",
            Self::Rule(_) => "RULE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for VitalsError {
    fn from(err: std::io::Error) -> Self {
        VitalsError::Io(err.to_string())
    }
}

/// A reading rejected before it reaches storage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("non-finite measurement value: {0}")]
    NonFiniteValue(f64),

    #[error("unrecognized record type: {0}")]
    UnknownRecordType(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: VitalsError = ValidationError::NonFiniteValue(f64::NAN).into();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: VitalsError = io.into();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert_eq!(err.status_code(), 500);
    }
}
