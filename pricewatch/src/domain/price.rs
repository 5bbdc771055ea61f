//! Price-change rules.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Minimum delta, in currency units, that counts as a change.
pub const DEFAULT_PRICE_TOLERANCE: f64 = 0.01;

/// An unchanged price is still sampled once per this many hours.
pub const DEFAULT_RESAMPLE_WINDOW_HOURS: i64 = 12;

/// Slack for binary representation error (5.01 - 5.00 < 0.01 in f64).
const FLOAT_SLACK: f64 = 1e-9;

/// Noise tolerance and periodic resample policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRules {
    pub tolerance: f64,
    pub resample_window: Duration,
}

impl Default for PriceRules {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_PRICE_TOLERANCE,
            resample_window: Duration::hours(DEFAULT_RESAMPLE_WINDOW_HOURS),
        }
    }
}

impl PriceRules {
    /// A first observation is always a change; otherwise the delta must reach
    /// the tolerance (inclusive).
    ///
    /// The comparison allows 1e-9 of float slack, so a delta in
    /// `[tolerance - 1e-9, tolerance)` also counts as a change. Without it
    /// `5.00 -> 5.01` would compare below 0.01 in f64.
    pub fn is_changed(&self, old: Option<f64>, new: f64) -> bool {
        match old {
            None => true,
            Some(old) => (old - new).abs() >= self.tolerance - FLOAT_SLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PriceDirection {
    Drop,
    Increase,
}

impl PriceDirection {
    pub fn between(old: f64, new: f64) -> Option<Self> {
        if new < old {
            Some(Self::Drop)
        } else if new > old {
            Some(Self::Increase)
        } else {
            None
        }
    }
}

/// A detected change between two known prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub direction: PriceDirection,
    pub old_price: f64,
    pub new_price: f64,
}

impl PriceChange {
    pub fn new(old_price: f64, new_price: f64) -> Option<Self> {
        PriceDirection::between(old_price, new_price).map(|direction| Self {
            direction,
            old_price,
            new_price,
        })
    }

    /// Savings for a drop, increase amount otherwise. Always non-negative.
    pub fn amount(&self) -> f64 {
        (self.old_price - self.new_price).abs()
    }

    /// `amount / old * 100`.
    pub fn percent(&self) -> f64 {
        if self.old_price <= 0.0 {
            return 0.0;
        }
        self.amount() / self.old_price * 100.0
    }
}
