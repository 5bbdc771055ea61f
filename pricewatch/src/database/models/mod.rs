//! Database models for pricewatch.
//!
//! These models map directly to the database schema. Timestamps are epoch
//! milliseconds (see [`crate::database::time`]).

pub mod credential;
pub mod item;
pub mod notification;
pub mod price_sample;
pub mod user;

pub use credential::*;
pub use item::*;
pub use notification::*;
pub use price_sample::*;
pub use user::*;
