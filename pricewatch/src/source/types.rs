//! Fetch result types.

use serde::{Deserialize, Serialize};

/// How a listing was fetched.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum FetchStrategy {
    /// Official API with an OAuth bearer token.
    Authenticated,
    /// External scraping endpoint.
    #[default]
    Scraper,
}

/// Canonical result of one fetch. Transient, consumed by the processor.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchResult {
    pub title: String,
    pub price: f64,
    pub image_url: Option<String>,
    pub original_price: Option<f64>,
    pub discount_percent: Option<i64>,
    pub strategy: FetchStrategy,
}

impl FetchResult {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
            ..Default::default()
        }
    }

    /// Non-empty title and a finite, positive price.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.price.is_finite() && self.price > 0.0
    }

    /// Reason this result is unusable, if any.
    pub fn validation_error(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            Some("missing title".to_string())
        } else if !self.price.is_finite() || self.price <= 0.0 {
            Some(format!("non-positive price {}", self.price))
        } else {
            None
        }
    }
}

/// `round((original - price) / original * 100)` when the listing is discounted.
pub fn discount_percent(original: Option<f64>, price: f64) -> Option<i64> {
    let original = original.filter(|o| o.is_finite() && *o > price && *o > 0.0)?;
    Some(((original - price) / original * 100.0).round() as i64)
}
