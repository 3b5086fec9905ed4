//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default so a partial (or missing) file still yields
//! a runnable configuration. Values are fixed for the life of the process.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::engine::aligner::MIN_OBSERVATIONS;
use crate::engine::signal::DEFAULT_ALERT_THRESHOLD;
use crate::types::MonitorError;

/// Longest accepted polling interval (one week).
pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// `minutes` as a polling `Duration`, or `None` when it is zero, above
/// `MAX_INTERVAL_MINUTES`, or overflows as seconds.
pub fn interval_from_minutes(minutes: u64) -> Option<Duration> {
    if minutes == 0 || minutes > MAX_INTERVAL_MINUTES {
        return None;
    }
    minutes.checked_mul(60).map(Duration::from_secs)
}

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub data_source: DataSourceConfig,
}

/// How the binary behaves after start-up.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Single analysis, then exit.
    Once,
    /// Poll until interrupted.
    Continuous,
    /// Single analysis, then ask the operator on stdin.
    #[default]
    Prompt,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MonitorConfig {
    #[serde(default = "default_pair_a")]
    pub pair_a: String,
    #[serde(default = "default_pair_b")]
    pub pair_b: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,
    /// Minimum number of aligned observations before fitting.
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,
    #[serde(default)]
    pub mode: RunMode,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataSourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_pair_a() -> String {
    "CADJPY=X".to_string()
}

fn default_pair_b() -> String {
    "NZDJPY=X".to_string()
}

fn default_lookback_days() -> u32 {
    1460
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_interval_minutes() -> u64 {
    60
}

fn default_min_observations() -> usize {
    MIN_OBSERVATIONS
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; PAIRWATCH/0.1.0)".to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pair_a: default_pair_a(),
            pair_b: default_pair_b(),
            lookback_days: default_lookback_days(),
            alert_threshold: default_alert_threshold(),
            interval_minutes: default_interval_minutes(),
            min_observations: default_min_observations(),
            mode: RunMode::default(),
        }
    }
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl MonitorConfig {
    /// Polling interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.saturating_mul(60))
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let pair_a = self.pair_a.trim();
        let pair_b = self.pair_b.trim();
        if pair_a.is_empty() || pair_b.is_empty() {
            return Err(MonitorError::Config("instrument symbols must not be empty".into()));
        }
        if pair_a.eq_ignore_ascii_case(pair_b) {
            return Err(MonitorError::Config(format!(
                "pair_a and pair_b must differ (both are {pair_a})"
            )));
        }
        if self.lookback_days == 0 {
            return Err(MonitorError::Config("lookback_days must be positive".into()));
        }
        if !(self.alert_threshold > 0.0 && self.alert_threshold <= 1.0) {
            return Err(MonitorError::Config(format!(
                "alert_threshold must be in (0, 1], got {}",
                self.alert_threshold
            )));
        }
        if interval_from_minutes(self.interval_minutes).is_none() {
            return Err(MonitorError::Config(format!(
                "interval_minutes must be between 1 and {MAX_INTERVAL_MINUTES}, got {}",
                self.interval_minutes
            )));
        }
        if self.min_observations < 3 {
            return Err(MonitorError::Config(format!(
                "min_observations must be at least 3, got {}",
                self.min_observations
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.monitor.validate()?;
        Ok(config)
    }
}
