//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use crate::error::AppError;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub masking: MaskingConfig,
    pub analysis: AnalysisConfig,
}

/// HTTP server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Comma-separated list of allowed origins, or `*`
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9002
}

fn default_workers() -> usize {
    num_cpus::get()
}

fn default_cors_origins() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: default_workers(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Database configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,

    /// Idle connection timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Apply the bundled reference schema at startup (local development only)
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_idle_timeout() -> u64 {
    600
}

/// Virtual number generation and lifetime
#[derive(Debug, Deserialize, Clone)]
pub struct MaskingConfig {
    /// HMAC key for number derivation
    #[serde(default)]
    pub secret: String,

    /// Prefix prepended to the derived digits
    #[serde(default = "default_country_prefix")]
    pub country_prefix: String,

    /// Number of hex characters taken from the digest
    #[serde(default = "default_digits")]
    pub digits: usize,

    /// Lifetime of a freshly generated number
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,

    /// Interval of the lapsed-number sweeper; 0 disables it
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_country_prefix() -> String {
    "+91".to_string()
}

fn default_digits() -> usize {
    10
}

fn default_ttl_hours() -> i64 {
    24
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            country_prefix: default_country_prefix(),
            digits: default_digits(),
            ttl_hours: default_ttl_hours(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Thresholds for suspicious call-pattern detection
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    /// Call count above which a booking is flagged
    #[serde(default = "default_max_calls")]
    pub max_calls: usize,

    /// First hour of the permitted calling window
    #[serde(default = "default_day_start")]
    pub day_start_hour: u32,

    /// Hour at which the permitted calling window closes
    #[serde(default = "default_day_end")]
    pub day_end_hour: u32,

    /// Minimum spacing between consecutive calls
    #[serde(default = "default_min_gap")]
    pub min_call_gap_secs: i64,

    /// IANA time zone used to evaluate the calling window
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Persist a security alert when a booking is flagged
    #[serde(default = "default_record_alerts")]
    pub record_alerts: bool,
}

fn default_max_calls() -> usize {
    10
}

fn default_day_start() -> u32 {
    6
}

fn default_day_end() -> u32 {
    22
}

fn default_min_gap() -> i64 {
    60
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_record_alerts() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_calls: default_max_calls(),
            day_start_hour: default_day_start(),
            day_end_hour: default_day_end(),
            min_call_gap_secs: default_min_gap(),
            timezone: default_timezone(),
            record_alerts: default_record_alerts(),
        }
    }
}

impl AnalysisConfig {
    /// Parse the configured time zone
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("Invalid analysis.timezone: {}", e)))
    }
}

/// Longest lifetime a virtual number may be issued with (one year)
const MAX_TTL_HOURS: i64 = 24 * 366;

/// Widest rapid-succession gap (one day)
const MAX_CALL_GAP_SECS: i64 = 24 * 60 * 60;

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.run_migrations", false)?
            .set_default("masking.secret", "")?
            .set_default("masking.country_prefix", default_country_prefix())?
            .set_default("masking.digits", 10)?
            .set_default("masking.ttl_hours", 24)?
            .set_default("masking.sweep_interval_secs", 300)?
            .set_default("analysis.max_calls", 10)?
            .set_default("analysis.day_start_hour", 6)?
            .set_default("analysis.day_end_hour", 22)?
            .set_default("analysis.min_call_gap_secs", 60)?
            .set_default("analysis.timezone", default_timezone())?
            .set_default("analysis.record_alerts", true)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Support legacy environment variables
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("masking.secret", env::var("VIRTUAL_NUMBER_SECRET").ok())?
            .set_override_option("server.host", env::var("HOST").ok())?
            .set_override_option("server.port", env::var("PORT").ok())?
            // Load from environment variables with CALLMASK__ prefix
            .add_source(
                Environment::with_prefix("CALLMASK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings the service cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.masking.digits == 0 || self.masking.digits > 64 {
            return Err(AppError::Config(format!(
                "masking.digits must be between 1 and 64, got {}",
                self.masking.digits
            )));
        }

        if !(1..=MAX_TTL_HOURS).contains(&self.masking.ttl_hours) {
            return Err(AppError::Config(format!(
                "masking.ttl_hours must be between 1 and {}, got {}",
                MAX_TTL_HOURS, self.masking.ttl_hours
            )));
        }

        if !(1..=MAX_CALL_GAP_SECS).contains(&self.analysis.min_call_gap_secs) {
            return Err(AppError::Config(format!(
                "analysis.min_call_gap_secs must be between 1 and {}, got {}",
                MAX_CALL_GAP_SECS, self.analysis.min_call_gap_secs
            )));
        }

        if self.analysis.day_start_hour >= self.analysis.day_end_hour
            || self.analysis.day_end_hour > 23
        {
            return Err(AppError::Config(format!(
                "analysis window {}..{} is not a valid daytime range",
                self.analysis.day_start_hour, self.analysis.day_end_hour
            )));
        }

        self.analysis.tz()?;

        Ok(())
    }

    /// Get the server bind address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AppConfig {
        AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgresql://localhost/callmask".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout_secs: 30,
                idle_timeout_secs: 600,
                run_migrations: false,
            },
            masking: MaskingConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }

    #[test]
    fn test_defaults() {
        let masking = MaskingConfig::default();
        assert_eq!(masking.country_prefix, "+91");
        assert_eq!(masking.digits, 10);
        assert_eq!(masking.ttl_hours, 24);

        let analysis = AnalysisConfig::default();
        assert_eq!(analysis.max_calls, 10);
        assert_eq!(analysis.day_start_hour, 6);
        assert_eq!(analysis.day_end_hour, 22);
        assert_eq!(analysis.min_call_gap_secs, 60);
        assert!(analysis.record_alerts);
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().server_addr(), "0.0.0.0:9002");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = sample();
        config.masking.digits = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.analysis.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());

        let mut config = sample();
        config.masking.ttl_hours = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.masking.ttl_hours = 0;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.analysis.min_call_gap_secs = -60;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.analysis.min_call_gap_secs = i64::MAX;
        assert!(config.validate().is_err());

        let mut config = sample();
        config.analysis.day_start_hour = 22;
        config.analysis.day_end_hour = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_timezone_parsing() {
        let mut analysis = AnalysisConfig::default();
        analysis.timezone = "Asia/Kolkata".to_string();
        assert_eq!(analysis.tz().unwrap(), chrono_tz::Asia::Kolkata);
    }
}
