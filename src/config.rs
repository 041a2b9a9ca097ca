//! Configuration management for the maintenance engine

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Risk policy thresholds and the base service interval
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    pub base_interval_months: u32,
    pub vibration_medium: f64,
    pub temperature_medium: f64,
    pub vibration_high: f64,
    pub temperature_high: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryConfig {
    pub tick_seconds: u64,
    /// Samples retained per unit; older ones are evicted first
    pub history_capacity: usize,
    /// Daily samples generated per unit when a session is seeded
    pub backfill_days: u32,
    pub seed: Option<u64>,
    /// Stop the run loop after this many ticks (runs until Ctrl-C when unset)
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// User the session acts as
    pub user_id: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub risk: RiskConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix MAINT_, e.g. MAINT_RISK__BASE_INTERVAL_MONTHS)
            .add_source(
                Environment::with_prefix("MAINT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.risk.base_interval_months == 0 {
            return Err(ConfigError::Message(
                "risk.base_interval_months must be at least 1".to_string(),
            ));
        }
        if self.risk.vibration_medium > self.risk.vibration_high
            || self.risk.temperature_medium > self.risk.temperature_high
        {
            return Err(ConfigError::Message(
                "risk medium thresholds must not exceed high thresholds".to_string(),
            ));
        }
        if self.telemetry.history_capacity == 0 {
            return Err(ConfigError::Message(
                "telemetry.history_capacity must be at least 1".to_string(),
            ));
        }
        if self.telemetry.tick_seconds == 0 {
            return Err(ConfigError::Message(
                "telemetry.tick_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            base_interval_months: 6,
            vibration_medium: 0.4,
            temperature_medium: 28.0,
            vibration_high: 0.5,
            temperature_high: 29.5,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 5,
            history_capacity: 50,
            backfill_days: 30,
            seed: None,
            max_ticks: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: "user-1".to_string(),
        }
    }
}
