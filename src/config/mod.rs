//! Configuration management for the funding rate alerter.
//!
//! Loads settings from an optional config file, `FRA__`-prefixed environment
//! variables and the conventional `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`
//! variables.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Exchange endpoints and HTTP settings
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// Threshold, ranking and cooldown settings
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Telegram bot credentials
    #[serde(default)]
    pub telegram: TelegramConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Public REST API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Web app base URL used for trade links in alerts
    #[serde(default = "default_web_url")]
    pub web_url: String,
    /// Contract type filter for the ticker listing
    #[serde(default = "default_contract_types")]
    pub contract_types: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertConfig {
    /// Minimum absolute funding rate, in percentage points (0.08 = ±0.08%)
    #[serde(default = "default_threshold")]
    pub threshold: Decimal,
    /// Number of top contracts to display and consider for alerts
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Path of the JSON cooldown record
    #[serde(default = "default_cooldown_file")]
    pub cooldown_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API base URL
    #[serde(default = "default_telegram_api_url")]
    pub api_url: String,
    /// Bot token (secret)
    #[serde(default)]
    pub bot_token: Option<String>,
    /// Target chat or channel id
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Delivery timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.india.delta.exchange".to_string()
}

fn default_web_url() -> String {
    "https://www.delta.exchange".to_string()
}

fn default_contract_types() -> String {
    "perpetual_futures".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    "delta-funding-scanner".to_string()
}

fn default_threshold() -> Decimal {
    Decimal::new(8, 2) // 0.08 percentage points
}

fn default_top_n() -> usize {
    3
}

fn default_cooldown_file() -> PathBuf {
    PathBuf::from("last_alerts.json")
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("FRA"))
            .set_override_option("telegram.bot_token", non_empty_env("TELEGRAM_BOT_TOKEN"))?
            .set_override_option("telegram.chat_id", non_empty_env("TELEGRAM_CHAT_ID"))?
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    ///
    /// Telegram credentials are deliberately not checked here: their absence
    /// is reported when an alert is about to be sent.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.alerts.threshold >= Decimal::ZERO,
            "alert threshold must not be negative"
        );

        anyhow::ensure!(self.alerts.top_n >= 1, "top_n must be at least 1");

        anyhow::ensure!(
            (1..=60).contains(&self.exchange.timeout_secs),
            "exchange timeout must be between 1 and 60 seconds"
        );

        anyhow::ensure!(
            (1..=60).contains(&self.telegram.timeout_secs),
            "telegram timeout must be between 1 and 60 seconds"
        );

        anyhow::ensure!(
            !self.exchange.base_url.trim().is_empty(),
            "exchange base_url must not be empty"
        );

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange: ExchangeConfig::default(),
            alerts: AlertConfig::default(),
            telegram: TelegramConfig::default(),
        }
    }
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            web_url: default_web_url(),
            contract_types: default_contract_types(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            top_n: default_top_n(),
            cooldown_file: default_cooldown_file(),
        }
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: default_telegram_api_url(),
            bot_token: None,
            chat_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.alerts.threshold, dec!(0.08));
        assert_eq!(config.alerts.top_n, 3);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.alerts.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.alerts.threshold = dec!(-0.01);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.exchange.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_credentials_are_not_a_validation_error() {
        let config = Config::default();
        assert!(config.telegram.bot_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"alerts": {"threshold": "0.1"}}"#).unwrap();
        assert_eq!(config.alerts.threshold, dec!(0.1));
        assert_eq!(config.alerts.top_n, 3);
        assert_eq!(config.exchange.contract_types, "perpetual_futures");
    }
}
