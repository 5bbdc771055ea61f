//! Item lifecycle: adding listings, on-demand refresh, history access and
//! history compaction.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use super::analytics::PriceAnalytics;
use crate::config::ItemConfig;
use crate::database::models::{MonitoredItemDbModel, PriceSampleDbModel};
use crate::database::repositories::{ItemRepository, PriceSampleRepository};
use crate::database::time::now_ms;
use crate::domain::{MonitoredItem, PriceRules};
use crate::monitor::{PriceUpdateProcessor, UpdateOutcome, check_item};
use crate::source::ProductSource;
use crate::source::url::{name_from_slug, normalize_url};
use crate::{Error, Result};

/// Number of samples returned by [`ItemService::price_history`] by default.
pub const DEFAULT_HISTORY_LIMIT: i64 = 30;

pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    samples: Arc<dyn PriceSampleRepository>,
    source: Arc<dyn ProductSource>,
    processor: Arc<PriceUpdateProcessor>,
    config: ItemConfig,
}

impl ItemService {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        samples: Arc<dyn PriceSampleRepository>,
        source: Arc<dyn ProductSource>,
        processor: Arc<PriceUpdateProcessor>,
        config: ItemConfig,
    ) -> Self {
        Self {
            items,
            samples,
            source,
            processor,
            config,
        }
    }

    /// Start tracking `url` for `user_id`.
    ///
    /// Returns the existing item when the user already tracks the same
    /// normalized URL. A new item is created pending and fetched once, bounded
    /// by the initial fetch timeout; if that fetch does not succeed the item
    /// stays pending until the next cycle.
    #[instrument(skip(self))]
    pub async fn add_item(&self, user_id: &str, url: &str) -> Result<MonitoredItem> {
        let normalized = normalize_url(url);
        if normalized.is_empty() {
            return Err(Error::validation("URL must not be empty"));
        }

        if let Some(existing) = self
            .items
            .find_by_user_and_url(user_id, &normalized)
            .await?
        {
            debug!(item_id = %existing.id, "Item already tracked");
            return Ok(existing.into());
        }

        let model = MonitoredItemDbModel::new(user_id, &normalized, name_from_slug(&normalized));
        self.items.create_item(&model).await?;
        info!(item_id = %model.id, url = %normalized, "Item added");

        let item = MonitoredItem::from(model);
        let fetch = check_item(self.source.as_ref(), &self.processor, &item);
        match tokio::time::timeout(self.config.initial_fetch_timeout, fetch).await {
            Ok(Ok(outcome)) if !outcome.skipped => {
                let refreshed = self.items.get_item(&item.id).await?;
                Ok(refreshed.into())
            }
            Ok(Ok(_)) => {
                warn!(item_id = %item.id, "Initial fetch returned invalid data; item left pending");
                Ok(item)
            }
            Ok(Err(e)) => {
                warn!(item_id = %item.id, error = %e, "Initial fetch failed; item left pending");
                Ok(item)
            }
            Err(_) => {
                warn!(
                    item_id = %item.id,
                    "Initial fetch timed out after {:?}; item left pending",
                    self.config.initial_fetch_timeout
                );
                Ok(item)
            }
        }
    }

    /// Fetch and apply one item now, outside the scheduled cycle.
    #[instrument(skip(self))]
    pub async fn refresh_item(&self, item_id: &str) -> Result<UpdateOutcome> {
        let item = MonitoredItem::from(self.items.get_item(item_id).await?);
        check_item(self.source.as_ref(), &self.processor, &item).await
    }

    /// Most recent samples, newest first.
    pub async fn price_history(
        &self,
        item_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<PriceSampleDbModel>> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.samples.recent_samples(item_id, limit).await
    }

    /// Remove samples that repeat the previous kept price of the same item.
    ///
    /// Returns the number of samples deleted.
    pub async fn cleanup_duplicate_history(&self) -> Result<u64> {
        let samples = self.samples.list_all_ordered().await?;
        let ids = duplicate_sample_ids(&samples, &self.processor.rules());
        if ids.is_empty() {
            debug!("No duplicate price samples found");
            return Ok(0);
        }

        let removed = self.samples.delete_samples(&ids).await?;
        info!(
            removed,
            scanned = samples.len(),
            "Removed duplicate price samples"
        );
        Ok(removed)
    }

    /// Price change statistics for `user_id` over the last `days` days.
    #[instrument(skip(self))]
    pub async fn analytics(&self, user_id: &str, days: u32) -> Result<PriceAnalytics> {
        if days == 0 {
            return Err(Error::validation("days must be at least 1"));
        }
        let since = now_ms() - chrono::Duration::days(i64::from(days)).num_milliseconds();

        let total_items = self.items.list_items_for_user(user_id).await?.len();
        let steps = self.samples.steps_for_user_since(user_id, since).await?;
        let report =
            PriceAnalytics::summarize(&steps, &self.processor.rules(), total_items, days);
        debug!(
            samples = steps.len(),
            total_changes = report.total_changes,
            "Computed price analytics"
        );
        Ok(report)
    }

    /// Stop tracking an item. Its samples go with it.
    pub async fn remove_item(&self, item_id: &str) -> Result<bool> {
        let removed = self.items.delete_item(item_id).await?;
        if removed {
            info!(item_id = %item_id, "Item removed");
        }
        Ok(removed)
    }
}

/// Ids of samples whose price is within tolerance of the last kept sample of
/// the same item. `samples` must be ordered by item, then time.
fn duplicate_sample_ids(samples: &[PriceSampleDbModel], rules: &PriceRules) -> Vec<i64> {
    let mut duplicates = Vec::new();
    let mut kept: Option<(&str, f64)> = None;

    for sample in samples {
        let last = kept;
        match last {
            Some((item_id, price))
                if item_id == sample.item_id && !rules.is_changed(Some(price), sample.price) =>
            {
                duplicates.push(sample.id);
            }
            _ => kept = Some((sample.item_id.as_str(), sample.price)),
        }
    }

    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: i64, item_id: &str, price: f64) -> PriceSampleDbModel {
        PriceSampleDbModel {
            id,
            item_id: item_id.to_string(),
            price,
            recorded_at: id * 1000,
        }
    }

    #[test]
    fn test_duplicates_compare_against_last_kept_sample() {
        let samples = vec![
            sample(1, "a", 100.0),
            sample(2, "a", 100.0),
            sample(3, "a", 100.005),
            sample(4, "a", 90.0),
            sample(5, "a", 100.0),
            sample(6, "b", 100.0),
            sample(7, "b", 100.0),
        ];
        let ids = duplicate_sample_ids(&samples, &PriceRules::default());
        assert_eq!(ids, vec![2, 3, 7]);
    }

    #[test]
    fn test_no_duplicates_in_empty_history() {
        assert!(duplicate_sample_ids(&[], &PriceRules::default()).is_empty());
    }
}
