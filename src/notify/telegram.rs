//! Telegram Bot API delivery.

use super::Notifier;
use crate::config::TelegramConfig;
use crate::error::AlertError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Reply envelope from `sendMessage`.
#[derive(Debug, Deserialize)]
struct TelegramReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to one chat through a bot.
///
/// Not `Debug`: it holds the bot token.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    api_url: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    /// Build a notifier. Missing credentials are accepted here and reported
    /// on `send`, so a scan can still run and display results.
    pub fn new(config: &TelegramConfig) -> Result<Self, AlertError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AlertError::Notification(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: non_empty(config.bot_token.as_deref()),
            chat_id: non_empty(config.chat_id.as_deref()),
        })
    }

    /// Whether both the bot token and the chat id are present.
    pub fn has_credentials(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    fn credentials(&self) -> Result<(&str, &str), AlertError> {
        let token = self
            .bot_token
            .as_deref()
            .ok_or_else(|| AlertError::ConfigMissing("TELEGRAM_BOT_TOKEN".to_string()))?;
        let chat_id = self
            .chat_id
            .as_deref()
            .ok_or_else(|| AlertError::ConfigMissing("TELEGRAM_CHAT_ID".to_string()))?;
        Ok((token, chat_id))
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    #[instrument(skip(self, text), fields(chars = text.chars().count()))]
    async fn send(&self, text: &str) -> Result<(), AlertError> {
        let (token, chat_id) = match self.credentials() {
            Ok(creds) => creds,
            Err(e) => {
                warn!("⚠️ [NOTIFY] Telegram credentials missing: {}", e);
                return Err(e);
            }
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, token);

        // The URL embeds the token, so errors are logged without it.
        let response = self
            .http
            .post(&url)
            .form(&[("chat_id", chat_id), ("text", text)])
            .send()
            .await
            .map_err(|e| {
                let err = AlertError::Notification(format!(
                    "Telegram request failed: {}",
                    e.without_url()
                ));
                warn!("⚠️ [NOTIFY] {}", err);
                err
            })?;

        let status = response.status();
        let reply: Option<TelegramReply> = response.json().await.ok();

        if !status.is_success() || !reply.as_ref().is_some_and(|r| r.ok) {
            let description = reply
                .and_then(|r| r.description)
                .unwrap_or_else(|| "no description".to_string());
            let err = AlertError::Notification(format!(
                "Telegram returned {}: {}",
                status, description
            ));
            warn!("⚠️ [NOTIFY] {}", err);
            return Err(err);
        }

        info!("📨 [NOTIFY] Telegram alert sent");
        Ok(())
    }
}
