use crate::analyzer::signal::DEFAULT_PROXIMITY_THRESHOLD;
use crate::fetcher::bybit::{interval_code, rows_for_lookback, PAGE_LIMIT};
use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub bot_token: String,
    pub channel_ids: Vec<u64>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_base")]
    pub base_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_exchange_base(),
            category: default_category(),
            timeout_seconds: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// Minimum series length; also the trend window and the average-volume window.
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_threshold")]
    pub proximity_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            lookback_days: default_lookback_days(),
            window: default_window(),
            proximity_threshold: default_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

fn default_command_prefix() -> String {
    "!".into()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".into()
}

fn default_poll_interval() -> u64 {
    2
}

fn default_exchange_base() -> String {
    "https://api.bybit.com".into()
}

fn default_category() -> String {
    "spot".into()
}

fn default_timeout() -> u64 {
    10
}

fn default_interval() -> String {
    "4h".into()
}

fn default_lookback_days() -> i64 {
    120
}

fn default_window() -> usize {
    42
}

fn default_threshold() -> f64 {
    DEFAULT_PROXIMITY_THRESHOLD
}

impl AppConfig {
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.bot_token.trim().is_empty() {
            return Err(ConfigError::Invalid("discord.bot_token is empty".into()));
        }
        if self.discord.channel_ids.is_empty() {
            return Err(ConfigError::Invalid("discord.channel_ids is empty".into()));
        }
        if self.discord.command_prefix.is_empty() {
            return Err(ConfigError::Invalid("discord.command_prefix is empty".into()));
        }
        // The volume-spike check reads the second-to-last bar.
        if self.analysis.window < 2 {
            return Err(ConfigError::Invalid("analysis.window must be at least 2".into()));
        }
        if self.analysis.lookback_days <= 0 {
            return Err(ConfigError::Invalid("analysis.lookback_days must be positive".into()));
        }
        let interval = &self.analysis.interval;
        if interval_code(interval).is_none() {
            return Err(ConfigError::Invalid(format!(
                "analysis.interval '{}' is not supported",
                interval
            )));
        }
        // A single kline page must cover the whole lookback.
        let rows = rows_for_lookback(interval, self.analysis.lookback_days).unwrap_or_default();
        if rows > PAGE_LIMIT as i64 {
            return Err(ConfigError::Invalid(format!(
                "analysis.lookback_days {} at {} needs {} bars, more than {} per request",
                self.analysis.lookback_days, interval, rows, PAGE_LIMIT
            )));
        }
        let threshold = self.analysis.proximity_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(ConfigError::Invalid(
                "analysis.proximity_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    AppConfig::from_json(&content)
}
