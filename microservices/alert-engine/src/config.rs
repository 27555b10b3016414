//! Alert Engine Configuration

use vitals_core::{Result, TimestampMs, VitalsError, HOUR_MS};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub check_interval_secs: u64,
    pub lookback_hours: i64,
    pub data_dir: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 30,
            lookback_hours: 24,
            data_dir: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        let lookback_hours = parse_lookback_hours(
            &std::env::var("LOOKBACK_HOURS").unwrap_or_else(|_| "24".to_string()),
        )?;

        Ok(Self {
            check_interval_secs: std::env::var("CHECK_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .unwrap_or(30)
                .max(1),
            lookback_hours,
            data_dir: std::env::var("DATA_DIR").ok().filter(|d| !d.is_empty()),
        })
    }

    /// Lookback in milliseconds, clamped to `i64::MAX` for hand-built configs
    pub fn lookback_ms(&self) -> TimestampMs {
        self.lookback_hours.saturating_mul(HOUR_MS)
    }
}

/// Positive hour count whose millisecond span fits a timestamp
fn parse_lookback_hours(raw: &str) -> Result<i64> {
    let hours: i64 = raw
        .trim()
        .parse()
        .map_err(|e| VitalsError::Config(format!("Invalid LOOKBACK_HOURS: {}", e)))?;
    if hours <= 0 {
        return Err(VitalsError::Config(format!(
            "LOOKBACK_HOURS must be positive, got {}",
            hours
        )));
    }
    if hours.checked_mul(HOUR_MS).is_none() {
        return Err(VitalsError::Config(format!(
            "LOOKBACK_HOURS out of range, got {}",
            hours
        )));
    }
    Ok(hours)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookback_is_one_day() {
        let config = EngineConfig::default();
        assert_eq!(config.lookback_ms(), vitals_core::DAY_MS);
        assert_eq!(config.check_interval_secs, 30);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_lookback_hours_parsing() {
        assert_eq!(parse_lookback_hours("48").unwrap(), 48);
        assert_eq!(parse_lookback_hours(" 1 ").unwrap(), 1);
        assert!(matches!(parse_lookback_hours("0"), Err(VitalsError::Config(_))));
        assert!(matches!(parse_lookback_hours("-3"), Err(VitalsError::Config(_))));
        assert!(matches!(parse_lookback_hours("soon"), Err(VitalsError::Config(_))));
    }

    #[test]
    fn test_lookback_hours_overflowing_millis_rejected() {
        assert!(matches!(
            parse_lookback_hours("3000000000000"),
            Err(VitalsError::Config(msg)) if msg.contains("out of range")
        ));
        let limit = i64::MAX / HOUR_MS;
        assert_eq!(parse_lookback_hours(&limit.to_string()).unwrap(), limit);
        assert!(parse_lookback_hours(&(limit + 1).to_string()).is_err());
    }

    #[test]
    fn test_lookback_ms_saturates() {
        let config = EngineConfig {
            lookback_hours: i64::MAX,
            ..EngineConfig::default()
        };
        assert_eq!(config.lookback_ms(), i64::MAX);
    }
}
