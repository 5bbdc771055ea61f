//! Monitored item lifecycle.

mod analytics;
mod service;

pub use analytics::{
    DailyChanges, ItemChangeRank, PriceAnalytics, RANK_NAME_LIMIT, TOP_ITEMS_LIMIT,
};
pub use service::{DEFAULT_HISTORY_LIMIT, ItemService};
