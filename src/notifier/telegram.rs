use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, warn};

use super::NotificationSink;
use crate::config::TelegramConfig;
use crate::constants::TELEGRAM_API_URL;
use crate::error::{Error, Result};

pub struct TelegramNotifier {
    client: Client,
    base_url: String,
    config: Option<TelegramConfig>,
}

impl TelegramNotifier {
    /// Without credentials the notifier stays disabled and every `notify`
    /// is a no-op.
    pub fn new(config: Option<TelegramConfig>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(config, TELEGRAM_API_URL, timeout)
    }

    pub fn with_base_url(
        config: Option<TelegramConfig>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        if config.is_none() {
            warn!("Telegram credentials missing. Notifications disabled.");
        }

        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    async fn send(&self, config: &TelegramConfig, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, config.bot_token);
        let payload = json!({
            "chat_id": config.chat_id,
            "text": text,
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Http(format!("Telegram API {}: {}", status, body)));
        }

        Ok(())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, text: &str) {
        let Some(config) = &self.config else {
            debug!("Telegram disabled, dropping summary");
            return;
        };

        match self.send(config, text).await {
            Ok(()) => debug!("Telegram notification sent"),
            Err(e) => error!("Failed to send Telegram alert: {}", e),
        }
    }
}
