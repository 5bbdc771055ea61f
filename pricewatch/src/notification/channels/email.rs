//! Email channel backed by a transactional email HTTP API.
//!
//! `POST {api_url}` with an `api-key` header and a JSON body carrying
//! sender, recipient, subject and HTML content.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use super::NotificationChannel;
use crate::Result;
use crate::config::EmailConfig;
use crate::database::models::UserDbModel;
use crate::notification::events::PriceAlert;

pub struct EmailChannel {
    config: EmailConfig,
    client: Client,
}

impl EmailChannel {
    pub fn new(client: Client, config: EmailConfig) -> Self {
        Self { config, client }
    }

    fn build_payload(&self, recipient: &str, alert: &PriceAlert) -> serde_json::Value {
        json!({
            "sender": {
                "name": self.config.from_name,
                "email": self.config.from_address,
            },
            "to": [{ "email": recipient }],
            "subject": alert.email_subject(),
            "htmlContent": alert.email_html(),
        })
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn channel_type(&self) -> &'static str {
        "email"
    }

    fn is_enabled(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
            && !self.config.from_address.is_empty()
    }

    fn recipient(&self, user: &UserDbModel) -> Option<String> {
        (user.email_notifications_enabled && !user.email.trim().is_empty())
            .then(|| user.email.trim().to_string())
    }

    async fn send(&self, recipient: &str, alert: &PriceAlert) -> Result<()> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Ok(());
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .header("api-key", api_key)
            .json(&self.build_payload(recipient, alert))
            .send()
            .await
            .map_err(|e| crate::Error::Other(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Email API failed: {} - {}", status, body);
            return Err(crate::Error::Other(format!(
                "Email API failed: {} - {}",
                status, body
            )));
        }

        debug!(item_id = %alert.item_id, "Email notification sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceDirection;

    fn config(api_key: Option<&str>) -> EmailConfig {
        EmailConfig {
            api_key: api_key.map(str::to_string),
            api_url: "https://mail.example.com/send".to_string(),
            from_address: "alerts@example.com".to_string(),
            from_name: "Alerts".to_string(),
        }
    }

    #[test]
    fn test_enabled_requires_api_key() {
        assert!(!EmailChannel::new(Client::new(), config(None)).is_enabled());
        assert!(EmailChannel::new(Client::new(), config(Some("k"))).is_enabled());
    }

    #[test]
    fn test_recipient_honors_user_flag() {
        let channel = EmailChannel::new(Client::new(), config(Some("k")));
        let mut user = UserDbModel::new("a@b.c", "A");
        assert_eq!(channel.recipient(&user).as_deref(), Some("a@b.c"));
        user.email_notifications_enabled = false;
        assert!(channel.recipient(&user).is_none());
    }

    #[test]
    fn test_payload_shape() {
        let channel = EmailChannel::new(Client::new(), config(Some("k")));
        let alert = PriceAlert {
            user_id: "u".into(),
            item_id: "i".into(),
            item_name: "Widget".into(),
            item_url: "https://x.com/p".into(),
            image_url: None,
            direction: PriceDirection::Drop,
            old_price: 100.0,
            new_price: 85.0,
        };
        let payload = channel.build_payload("a@b.c", &alert);
        assert_eq!(payload["to"][0]["email"], "a@b.c");
        assert_eq!(payload["sender"]["email"], "alerts@example.com");
        assert!(payload["subject"].as_str().unwrap().contains("Widget"));
        assert!(payload["htmlContent"].as_str().unwrap().contains("R$ 85.00"));
    }
}
