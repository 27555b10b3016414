//! Telemetry Configuration

use std::env;

/// Log output settings resolved at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    /// Fallback filter directives when `RUST_LOG` is unset
    pub log_level: String,
    pub json_logs: bool,
}

impl TelemetryConfig {
    /// Read `SERVICE_NAME`, `LOG_LEVEL` and `JSON_LOGS`, falling back to `default_name`,
    /// `info` and JSON output.
    pub fn for_service(default_name: &str) -> Self {
        Self::resolve(default_name, |key| env::var(key).ok())
    }

    fn resolve(default_name: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            service_name: non_empty("SERVICE_NAME").unwrap_or_else(|| default_name.to_string()),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            json_logs: non_empty("JSON_LOGS").map_or(true, |v| is_truthy(&v)),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
