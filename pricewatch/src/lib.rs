//! pricewatch library crate.
//!
//! Periodic price tracking for product listings: fetch, detect changes,
//! keep a price history and notify owners.

pub mod config;
pub mod credentials;
pub mod database;
pub mod domain;
pub mod error;
pub mod items;
pub mod logging;
pub mod monitor;
pub mod notification;
pub mod scheduler;
pub mod source;

pub use error::{Error, Result};
