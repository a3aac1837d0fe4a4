//! Configuration management for racecal
//!
//! This module handles loading and validating configuration from environment
//! variables and TOML files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default contest listing page
pub const DEFAULT_SOURCE_URL: &str = "http://www.taipeimarathon.org.tw/contest.aspx";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Contest page source configuration
    pub source: SourceConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Crawl schedule configuration
    pub schedule: ScheduleConfig,

    /// Query API server configuration
    pub server: ServerConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Contest page fetch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the contest listing page
    pub url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Retries after the first failed attempt
    pub max_retries: u32,

    /// User agent string
    pub user_agent: String,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Crawl schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local hours (0-23) at which a crawl runs
    pub hours: Vec<u32>,

    /// Offset of the schedule's local time from UTC, in hours
    pub utc_offset_hours: i32,

    /// Crawl once immediately when the scheduler starts
    pub run_on_startup: bool,
}

/// Query API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let url = std::env::var("RACECAL_SOURCE_URL").unwrap_or(defaults.source.url);

        let request_timeout_secs = std::env::var("RACECAL_REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.source.request_timeout_secs);

        let max_retries = std::env::var("RACECAL_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.source.max_retries);

        let user_agent =
            std::env::var("RACECAL_USER_AGENT").unwrap_or(defaults.source.user_agent);

        let sqlite_path = std::env::var("RACECAL_SQLITE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database.sqlite_path);

        let hours = match std::env::var("RACECAL_SCHEDULE_HOURS") {
            Ok(v) => parse_hours(&v)
                .with_context(|| format!("Invalid RACECAL_SCHEDULE_HOURS: {v}"))?,
            Err(_) => defaults.schedule.hours,
        };

        let utc_offset_hours = std::env::var("RACECAL_UTC_OFFSET")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(defaults.schedule.utc_offset_hours);

        let run_on_startup = std::env::var("RACECAL_RUN_ON_STARTUP")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.schedule.run_on_startup);

        let host = std::env::var("RACECAL_HOST").unwrap_or(defaults.server.host);

        let port = std::env::var("RACECAL_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.server.port);

        let log_level = std::env::var("RACECAL_LOG_LEVEL").unwrap_or(defaults.logging.level);

        let log_format = std::env::var("RACECAL_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            source: SourceConfig {
                url,
                request_timeout_secs,
                max_retries,
                user_agent,
            },
            database: DatabaseConfig { sqlite_path },
            schedule: ScheduleConfig {
                hours,
                utc_offset_hours,
                run_on_startup,
            },
            server: ServerConfig { host, port },
            logging: LoggingConfig {
                level: log_level,
                format: log_format,
            },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.source.url)
            .with_context(|| format!("source.url is not a valid URL: {}", self.source.url))?;

        if self.source.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }

        if self.schedule.hours.is_empty() {
            anyhow::bail!("schedule.hours must not be empty");
        }

        if let Some(hour) = self.schedule.hours.iter().find(|h| **h > 23) {
            anyhow::bail!("schedule hour {hour} is out of range 0-23");
        }

        if !(-12..=14).contains(&self.schedule.utc_offset_hours) {
            anyhow::bail!(
                "utc_offset_hours {} is out of range -12..=14",
                self.schedule.utc_offset_hours
            );
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("logging.format must be 'text' or 'json'");
        }

        Ok(())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.request_timeout_secs)
    }

    /// Server bind address
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceConfig {
                url: String::from(DEFAULT_SOURCE_URL),
                request_timeout_secs: 30,
                max_retries: 3,
                user_agent: format!("racecal/{}", env!("CARGO_PKG_VERSION")),
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/events.db"),
            },
            schedule: ScheduleConfig {
                hours: vec![3, 15],
                utc_offset_hours: 8,
                run_on_startup: false,
            },
            server: ServerConfig {
                host: String::from("127.0.0.1"),
                port: 3000,
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

/// Parse a comma-separated list of hours such as `3,15`
fn parse_hours(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("'{s}' is not an hour"))
        })
        .collect()
}
