//! User database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model.
/// Only the columns the notification pipeline reads are mapped.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserDbModel {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub email_notifications_enabled: bool,
    pub telegram_chat_id: Option<String>,
    pub telegram_enabled: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserDbModel {
    pub fn new(email: impl Into<String>, full_name: impl Into<String>) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            full_name: full_name.into(),
            email_notifications_enabled: true,
            telegram_chat_id: None,
            telegram_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Chat id when the user has the Telegram channel switched on.
    pub fn telegram_target(&self) -> Option<&str> {
        if !self.telegram_enabled {
            return None;
        }
        self.telegram_chat_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}
