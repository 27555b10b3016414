//! Runtime configuration shared by every service

use crate::error::{Result, VitalsError};
use std::env;

const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 5;

/// Lifecycle settings for `MicroserviceRuntime`; logging is configured by the telemetry crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub shutdown_grace_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        match env::var("SHUTDOWN_GRACE_SECS") {
            Ok(raw) => Ok(Self {
                shutdown_grace_secs: parse_grace_secs(&raw)?,
            }),
            Err(_) => Ok(Self::default()),
        }
    }
}

fn parse_grace_secs(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|e| VitalsError::Config(format!("Invalid SHUTDOWN_GRACE_SECS: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grace_secs_parsing() {
        assert_eq!(parse_grace_secs(" 12 ").unwrap(), 12);
        assert!(matches!(parse_grace_secs("-1"), Err(VitalsError::Config(_))));
        assert_eq!(ServiceConfig::default().shutdown_grace_secs, 5);
    }
}
