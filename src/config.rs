//! Configuration management for the sampling pipeline
//!
//! This module provides configuration file support with TOML format,
//! environment variable overrides, and sensible defaults.
//!
//! ```toml
//! [aggregation]
//! first_day_of_week = "Mon"
//! start_time_of_day = "04:00"
//! time_zone = "Europe/London"
//!
//! [logging]
//! level = "info"
//! structured = false
//! ```

use crate::error::{Error, Result};
use crate::pipeline::SampleContext;
use crate::time::AggregationPreferences;
use chrono::{NaiveTime, TimeDelta, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Calendar alignment preferences
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Calendar alignment configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregationConfig {
    /// Day a week starts on ("Mon", "tuesday", ...)
    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: Weekday,

    /// Local time a day starts at, `HH:MM` or `HH:MM:SS`
    #[serde(default = "default_start_time_of_day")]
    pub start_time_of_day: String,

    /// IANA zone used for calendar boundaries
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-like structured fields instead of compact text
    #[serde(default)]
    pub structured: bool,
}

fn default_first_day_of_week() -> Weekday { Weekday::Mon }
fn default_start_time_of_day() -> String { "00:00".to_string() }
fn default_time_zone() -> String { "UTC".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            first_day_of_week: default_first_day_of_week(),
            start_time_of_day: default_start_time_of_day(),
            time_zone: default_time_zone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            structured: false,
        }
    }
}

impl AggregationConfig {
    /// Start of day as an offset from midnight
    pub fn start_time_of_day(&self) -> std::result::Result<TimeDelta, String> {
        parse_time_of_day(&self.start_time_of_day)
    }

    /// Configured time zone
    pub fn time_zone(&self) -> std::result::Result<Tz, String> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| format!("Unknown time zone '{}': {}", self.time_zone, e))
    }

    /// Preferences to thread through a computation
    pub fn preferences(&self) -> Result<AggregationPreferences> {
        let start = self.start_time_of_day().map_err(Error::Configuration)?;
        Ok(AggregationPreferences::new(self.first_day_of_week, start))
    }

    /// Build a pipeline context from this configuration
    pub fn context(&self) -> Result<SampleContext> {
        let zone = self.time_zone().map_err(Error::Configuration)?;
        Ok(SampleContext::new(self.preferences()?, zone))
    }
}

fn parse_time_of_day(value: &str) -> std::result::Result<TimeDelta, String> {
    let time = NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| format!("Invalid start time of day '{}': {}", value, e))?;
    Ok(time.signed_duration_since(NaiveTime::MIN))
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> std::result::Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path, e))?;

        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file {}: {}", path, e))
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> std::result::Result<Self, String> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from environment variables only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        // Aggregation
        if let Ok(day) = std::env::var("KUBA_FIRST_DAY_OF_WEEK") {
            if let Ok(d) = day.parse() {
                self.aggregation.first_day_of_week = d;
            }
        }
        if let Ok(start) = std::env::var("KUBA_START_TIME_OF_DAY") {
            self.aggregation.start_time_of_day = start;
        }
        if let Ok(zone) = std::env::var("KUBA_TIME_ZONE") {
            self.aggregation.time_zone = zone;
        }

        // Logging
        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        // parse_time_of_day rejects anything at or past 24:00
        self.aggregation.start_time_of_day()?;
        self.aggregation.time_zone()?;

        if self.logging.level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }

        Ok(())
    }

    /// Save configuration to TOML file
    pub fn save_to_file(&self, path: &str) -> std::result::Result<(), String> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, contents)
            .map_err(|e| format!("Failed to write config file {}: {}", path, e))
    }
}
