//! Domain types for the price-monitoring pipeline.

pub mod item;
pub mod price;

pub use item::MonitoredItem;
pub use price::{PriceChange, PriceDirection, PriceRules};
