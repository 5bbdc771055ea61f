//! Price history sample model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single append-only price observation.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PriceSampleDbModel {
    pub id: i64,
    pub item_id: String,
    pub price: f64,
    /// Unix epoch milliseconds (UTC).
    pub recorded_at: i64,
}

/// A sample of one user's item, paired with the price of the sample before it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SampleStepDbModel {
    pub item_id: String,
    pub item_name: String,
    pub price: f64,
    /// `None` for the first sample of the item.
    pub prior_price: Option<f64>,
    pub recorded_at: i64,
}
