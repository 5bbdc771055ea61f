//! Price alert notifications.
//!
//! [`NotificationDispatcher`] delivers a [`PriceAlert`] through every
//! configured [`NotificationChannel`].

pub mod channels;
pub mod dispatcher;
pub mod events;

pub use channels::{EmailChannel, FeedChannel, NotificationChannel, TelegramChannel};
pub use dispatcher::{DispatchStats, NotificationDispatcher};
pub use events::PriceAlert;
