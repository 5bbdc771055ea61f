//! Monitored item database model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Monitored item database model.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MonitoredItemDbModel {
    pub id: String,
    pub user_id: String,
    /// Normalized listing URL.
    pub url: String,
    pub name: String,
    pub image_url: Option<String>,
    pub current_price: Option<f64>,
    /// Last price that differed from `current_price`.
    pub previous_price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i64>,
    pub notify_on_drop: bool,
    pub notify_on_increase: bool,
    /// Lifecycle status: PENDING, ACTIVE
    pub status: String,
    pub last_checked_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MonitoredItemDbModel {
    /// Create a new pending item with default notification flags.
    pub fn new(user_id: impl Into<String>, url: impl Into<String>, name: impl Into<String>) -> Self {
        let now = crate::database::time::now_ms();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            url: url.into(),
            name: name.into(),
            image_url: None,
            current_price: None,
            previous_price: None,
            original_price: None,
            discount_percent: None,
            notify_on_drop: true,
            notify_on_increase: false,
            status: ItemStatus::Pending.to_string(),
            last_checked_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Item lifecycle status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Created, first successful fetch not yet seen.
    #[default]
    Pending,
    Active,
}

impl ItemStatus {
    /// Parse a stored status, treating unknown values as pending.
    pub fn parse(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}
