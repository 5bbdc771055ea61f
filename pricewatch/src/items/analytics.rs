//! Price change analytics over a user's history.
//!
//! A change is a sample whose price differs from the item's preceding sample
//! by at least the price tolerance. Periodic resamples of an unchanged price
//! and first observations are not changes. Buckets use UTC.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use serde::Serialize;

use crate::database::models::SampleStepDbModel;
use crate::database::time::ms_to_datetime;
use crate::domain::PriceRules;
use crate::notification::events::truncate_chars;

/// Maximum number of entries in [`PriceAnalytics::top_items`].
pub const TOP_ITEMS_LIMIT: usize = 10;

/// Item names in the ranking are cut to this many characters.
pub const RANK_NAME_LIMIT: usize = 50;

/// Weekdays in report order.
const WEEK: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyChanges {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemChangeRank {
    pub item_id: String,
    pub item_name: String,
    pub change_count: u64,
}

/// Change statistics for one user over the last `days` days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceAnalytics {
    pub days: u32,
    pub total_changes: u64,
    pub total_items: usize,
    /// Rounded to one decimal.
    pub avg_changes_per_day: f64,
    /// Only dates with at least one change, oldest first.
    pub changes_by_date: Vec<DailyChanges>,
    /// Indexed by hour of day, 0 to 23.
    pub changes_by_hour: [u64; 24],
    /// Sunday first.
    pub changes_by_weekday: Vec<(Weekday, u64)>,
    pub top_items: Vec<ItemChangeRank>,
    /// Hour with the most changes; the earliest wins a tie, 0 when there are none.
    pub peak_hour: u32,
    /// Weekday with the most changes; the earliest from Sunday wins a tie,
    /// Monday when there are none.
    pub peak_weekday: Weekday,
}

impl PriceAnalytics {
    pub fn summarize(
        steps: &[SampleStepDbModel],
        rules: &PriceRules,
        total_items: usize,
        days: u32,
    ) -> Self {
        let mut total_changes = 0u64;
        let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        let mut by_hour = [0u64; 24];
        let mut by_weekday: HashMap<Weekday, u64> = HashMap::new();
        let mut by_item: HashMap<&str, (&str, u64)> = HashMap::new();

        let changes = steps.iter().filter(|step| {
            step.prior_price
                .is_some_and(|prior| rules.is_changed(Some(prior), step.price))
        });
        for step in changes {
            let at = ms_to_datetime(step.recorded_at);
            total_changes += 1;
            *by_date.entry(at.date_naive()).or_default() += 1;
            by_hour[at.hour() as usize] += 1;
            *by_weekday.entry(at.weekday()).or_default() += 1;
            by_item
                .entry(step.item_id.as_str())
                .or_insert((step.item_name.as_str(), 0))
                .1 += 1;
        }

        let mut peak_hour = 0u32;
        let mut peak_hour_count = 0u64;
        for (hour, count) in by_hour.iter().enumerate() {
            if *count > peak_hour_count {
                peak_hour_count = *count;
                peak_hour = hour as u32;
            }
        }

        let changes_by_weekday: Vec<(Weekday, u64)> = WEEK
            .iter()
            .map(|day| (*day, by_weekday.get(day).copied().unwrap_or(0)))
            .collect();
        let mut peak_weekday = Weekday::Mon;
        let mut peak_weekday_count = 0u64;
        for (day, count) in &changes_by_weekday {
            if *count > peak_weekday_count {
                peak_weekday_count = *count;
                peak_weekday = *day;
            }
        }

        let mut top_items: Vec<ItemChangeRank> = by_item
            .into_iter()
            .map(|(item_id, (name, change_count))| ItemChangeRank {
                item_id: item_id.to_string(),
                item_name: truncate_chars(name, RANK_NAME_LIMIT),
                change_count,
            })
            .collect();
        top_items.sort_by(|a, b| {
            b.change_count
                .cmp(&a.change_count)
                .then_with(|| a.item_name.cmp(&b.item_name))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        top_items.truncate(TOP_ITEMS_LIMIT);

        let avg_changes_per_day = if days > 0 {
            (total_changes as f64 / days as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        Self {
            days,
            total_changes,
            total_items,
            avg_changes_per_day,
            changes_by_date: by_date
                .into_iter()
                .map(|(date, count)| DailyChanges { date, count })
                .collect(),
            changes_by_hour: by_hour,
            changes_by_weekday,
            top_items,
            peak_hour,
            peak_weekday,
        }
    }
}
