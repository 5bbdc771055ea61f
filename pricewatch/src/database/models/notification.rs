//! In-app notification feed model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// In-app feed entry shown to the user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct FeedEntryDbModel {
    pub id: String,
    pub user_id: String,
    pub item_id: Option<String>,
    /// PRICE_DROP or PRICE_INCREASE
    pub kind: String,
    pub title: String,
    pub message: String,
    pub old_price: Option<f64>,
    pub new_price: Option<f64>,
    pub is_read: bool,
    pub created_at: i64,
}

impl FeedEntryDbModel {
    pub fn new(
        user_id: impl Into<String>,
        item_id: Option<String>,
        kind: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            item_id,
            kind: kind.into(),
            title: title.into(),
            message: message.into(),
            old_price: None,
            new_price: None,
            is_read: false,
            created_at: crate::database::time::now_ms(),
        }
    }

    pub fn with_prices(mut self, old_price: f64, new_price: f64) -> Self {
        self.old_price = Some(old_price);
        self.new_price = Some(new_price);
        self
    }
}
