//! In-app notification feed.

use std::sync::Arc;

use async_trait::async_trait;

use super::NotificationChannel;
use crate::Result;
use crate::database::models::{FeedEntryDbModel, UserDbModel};
use crate::database::repositories::FeedRepository;
use crate::notification::events::PriceAlert;

/// Writes alerts to the user's in-app feed.
pub struct FeedChannel {
    repo: Arc<dyn FeedRepository>,
}

impl FeedChannel {
    pub fn new(repo: Arc<dyn FeedRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl NotificationChannel for FeedChannel {
    fn channel_type(&self) -> &'static str {
        "feed"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn requires_item_opt_in(&self) -> bool {
        false
    }

    fn recipient(&self, user: &UserDbModel) -> Option<String> {
        Some(user.id.clone())
    }

    async fn send(&self, recipient: &str, alert: &PriceAlert) -> Result<()> {
        let entry = FeedEntryDbModel::new(
            recipient,
            Some(alert.item_id.clone()),
            alert.kind(),
            alert.title(),
            alert.message(),
        )
        .with_prices(alert.old_price, alert.new_price);
        self.repo.insert_entry(&entry).await
    }
}
