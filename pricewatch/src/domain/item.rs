//! Monitored item domain entity.

use chrono::{DateTime, Utc};

use super::price::PriceDirection;
use crate::database::models::{ItemStatus, MonitoredItemDbModel};
use crate::database::time::ms_to_datetime;

/// A product listing tracked for one user.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredItem {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub name: String,
    pub image_url: Option<String>,
    pub current_price: Option<f64>,
    pub previous_price: Option<f64>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i64>,
    pub notify_on_drop: bool,
    pub notify_on_increase: bool,
    pub status: ItemStatus,
    pub last_checked_at: Option<DateTime<Utc>>,
}

impl MonitoredItem {
    /// Whether the owner asked to hear about changes in this direction.
    pub fn wants(&self, direction: PriceDirection) -> bool {
        match direction {
            PriceDirection::Drop => self.notify_on_drop,
            PriceDirection::Increase => self.notify_on_increase,
        }
    }
}

impl From<MonitoredItemDbModel> for MonitoredItem {
    fn from(model: MonitoredItemDbModel) -> Self {
        Self {
            status: ItemStatus::parse(&model.status),
            last_checked_at: model.last_checked_at.map(ms_to_datetime),
            id: model.id,
            user_id: model.user_id,
            url: model.url,
            name: model.name,
            image_url: model.image_url,
            current_price: model.current_price,
            previous_price: model.previous_price,
            original_price: model.original_price,
            discount_percent: model.discount_percent,
            notify_on_drop: model.notify_on_drop,
            notify_on_increase: model.notify_on_increase,
        }
    }
}
