//! Notification channels.
//!
//! - In-app feed (database)
//! - Email (HTTP email API)
//! - Telegram Bot API

mod email;
mod feed;
mod telegram;

pub use email::EmailChannel;
pub use feed::FeedChannel;
pub use telegram::TelegramChannel;

use async_trait::async_trait;

use super::events::PriceAlert;
use crate::Result;
use crate::database::models::UserDbModel;

/// Trait for notification channels.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Get the channel type name.
    fn channel_type(&self) -> &'static str;

    /// Check if the channel is configured at the deployment level.
    fn is_enabled(&self) -> bool;

    /// Whether delivery also needs the item's per-direction opt-in.
    ///
    /// The in-app feed is always written; outbound channels honor the
    /// `notify_on_drop` / `notify_on_increase` flags.
    fn requires_item_opt_in(&self) -> bool {
        true
    }

    /// Address for `user` on this channel, or `None` when the user has the
    /// channel switched off.
    fn recipient(&self, user: &UserDbModel) -> Option<String>;

    /// Deliver one alert.
    async fn send(&self, recipient: &str, alert: &PriceAlert) -> Result<()>;
}
