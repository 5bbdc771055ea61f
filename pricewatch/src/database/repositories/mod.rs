//! Repository layer for database access.
//!
//! Each repository is an `async_trait` so services can be exercised against
//! fakes; the `*TxOps` helpers run inside an existing `BEGIN IMMEDIATE`
//! transaction and never commit on their own.

pub mod credential_store;
pub mod item;
pub mod notification;
pub mod price_sample;
pub mod user;

pub use credential_store::*;
pub use item::*;
pub use notification::*;
pub use price_sample::*;
pub use user::*;
