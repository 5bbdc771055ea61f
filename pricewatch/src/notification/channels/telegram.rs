//! Telegram Bot API notification channel.
//!
//! Sends messages via the Telegram Bot API (`POST /bot<token>/sendMessage`).
//! Handles 429 rate limits by respecting the `parameters.retry_after` field
//! returned in the JSON response body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use super::NotificationChannel;
use crate::Result;
use crate::database::models::UserDbModel;
use crate::notification::events::PriceAlert;

/// Maximum number of retries for rate-limited requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Telegram notification channel.
pub struct TelegramChannel {
    bot_token: Option<String>,
    api_base: String,
    client: Client,
}

impl TelegramChannel {
    pub fn new(client: Client, bot_token: Option<String>) -> Self {
        Self {
            bot_token: bot_token.filter(|t| !t.is_empty()),
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Point the channel at a different Bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Send request with rate limit handling.
    async fn send_with_retry(&self, token: &str, payload: &serde_json::Value) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let mut attempts = 0;

        loop {
            attempts += 1;

            let response = self
                .client
                .post(&url)
                .json(payload)
                .send()
                .await
                .map_err(|e| crate::Error::Other(format!("Telegram request failed: {}", e)))?;

            let status = response.status();

            if status.is_success() {
                return Ok(());
            }

            if status.as_u16() == 429 {
                let body: serde_json::Value = response.json().await.unwrap_or_default();

                let retry_after = body
                    .get("parameters")
                    .and_then(|p| p.get("retry_after"))
                    .and_then(|v| v.as_u64())
                    .map(Duration::from_secs);

                if attempts >= MAX_RATE_LIMIT_RETRIES {
                    warn!(
                        "Telegram rate limit: max retries ({}) exceeded, last retry_after was {:?}",
                        MAX_RATE_LIMIT_RETRIES, retry_after
                    );
                    return Err(crate::Error::Other(format!(
                        "Telegram rate limit exceeded after {} retries",
                        MAX_RATE_LIMIT_RETRIES
                    )));
                }

                let wait_duration = retry_after.unwrap_or(Duration::from_secs(1));
                debug!(
                    "Telegram rate limited (429), waiting {:?} before retry (attempt {}/{})",
                    wait_duration, attempts, MAX_RATE_LIMIT_RETRIES
                );
                tokio::time::sleep(wait_duration).await;
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            warn!("Telegram sendMessage failed: {} - {}", status, body);
            return Err(crate::Error::Other(format!(
                "Telegram sendMessage failed: {} - {}",
                status, body
            )));
        }
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn channel_type(&self) -> &'static str {
        "telegram"
    }

    fn is_enabled(&self) -> bool {
        self.bot_token.is_some()
    }

    fn recipient(&self, user: &UserDbModel) -> Option<String> {
        user.telegram_target().map(str::to_string)
    }

    async fn send(&self, recipient: &str, alert: &PriceAlert) -> Result<()> {
        let Some(token) = self.bot_token.as_deref() else {
            return Ok(());
        };

        let payload = json!({
            "chat_id": recipient,
            "text": alert.chat_markdown(),
            "parse_mode": "Markdown",
            "disable_web_page_preview": false,
        });

        self.send_with_retry(token, &payload).await?;

        debug!(item_id = %alert.item_id, "Telegram notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_channel_disabled_without_token() {
        assert!(!TelegramChannel::new(Client::new(), None).is_enabled());
        assert!(!TelegramChannel::new(Client::new(), Some(String::new())).is_enabled());
        assert!(TelegramChannel::new(Client::new(), Some("123:ABC".into())).is_enabled());
    }

    #[test]
    fn test_recipient_requires_opt_in() {
        let channel = TelegramChannel::new(Client::new(), Some("123:ABC".into()));
        let mut user = UserDbModel::new("a@b.c", "A");
        user.telegram_chat_id = Some("42".into());
        assert!(channel.recipient(&user).is_none());
        user.telegram_enabled = true;
        assert_eq!(channel.recipient(&user).as_deref(), Some("42"));
    }

    #[test]
    fn test_api_base_override() {
        let channel = TelegramChannel::new(Client::new(), Some("t".into()))
            .with_api_base("http://127.0.0.1:9999/");
        assert_eq!(channel.api_base, "http://127.0.0.1:9999");
    }
}
