//! Price update state machine.
//!
//! # Rules
//!
//! | Fetch result | Price vs. stored      | Item row                  | Sample                     | Alert |
//! |--------------|-----------------------|---------------------------|----------------------------|-------|
//! | invalid      | -                     | untouched                 | no                         | no    |
//! | valid        | first observation     | current set               | yes                        | no    |
//! | valid        | changed (>= tolerance)| previous = old, current   | yes                        | yes   |
//! | valid        | unchanged             | current, previous kept    | only if none within window | no    |
//!
//! Every valid result also refreshes the display fields, `last_checked_at`
//! and marks the item active.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::database::repositories::{ItemTxOps, PriceCheckUpdate, PriceSampleTxOps};
use crate::database::retry::retry_on_sqlite_busy;
use crate::database::time::now_ms;
use crate::database::{WritePool, begin_immediate};
use crate::domain::{MonitoredItem, PriceChange, PriceRules};
use crate::notification::{NotificationDispatcher, PriceAlert};
use crate::source::FetchResult;
use crate::{Error, Result};

/// What one `apply` call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UpdateOutcome {
    /// The price moved by at least the tolerance, or was seen for the first time.
    pub changed: bool,
    /// The result was invalid and nothing was written.
    pub skipped: bool,
    pub sample_recorded: bool,
    /// Set when an alert was handed to the dispatcher.
    pub notified: bool,
}

impl UpdateOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

pub struct PriceUpdateProcessor {
    write_pool: WritePool,
    rules: PriceRules,
    dispatcher: Arc<NotificationDispatcher>,
}

impl PriceUpdateProcessor {
    pub fn new(
        write_pool: WritePool,
        rules: PriceRules,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            write_pool,
            rules,
            dispatcher,
        }
    }

    pub fn rules(&self) -> PriceRules {
        self.rules
    }

    /// Apply one fetch result to `item`.
    ///
    /// The stored prices are re-read inside the transaction, so the change
    /// decision never uses the possibly stale `item` snapshot. The item update
    /// and the optional sample are written in the same immediate transaction.
    /// Alerts are dispatched only after commit.
    #[instrument(skip_all, fields(item_id = %item.id))]
    pub async fn apply(&self, item: &MonitoredItem, result: &FetchResult) -> Result<UpdateOutcome> {
        if let Some(reason) = result.validation_error() {
            debug!(%reason, "Skipping invalid fetch result");
            return Ok(UpdateOutcome::skipped());
        }

        let new_price = result.price;
        let rules = self.rules;

        let (old_price, changed, sample_recorded) =
            retry_on_sqlite_busy("apply_price_check", || async {
                let mut tx = begin_immediate(&self.write_pool).await?;

                let Some(stored) = ItemTxOps::get_prices(&mut tx, &item.id).await? else {
                    tx.rollback().await?;
                    return Err(Error::not_found("MonitoredItem", &item.id));
                };
                let old_price = stored.current_price;
                let changed = rules.is_changed(old_price, new_price);

                let now = now_ms();
                let update = PriceCheckUpdate {
                    name: &result.title,
                    image_url: result.image_url.as_deref(),
                    current_price: new_price,
                    previous_price: if changed {
                        old_price
                    } else {
                        stored.previous_price
                    },
                    original_price: result.original_price,
                    discount_percent: result.discount_percent,
                    checked_at: now,
                };
                ItemTxOps::apply_price_check(&mut tx, &item.id, &update).await?;

                let window_start = now - rules.resample_window.num_milliseconds();
                let record = changed
                    || !PriceSampleTxOps::exists_since(&mut tx, &item.id, window_start).await?;
                if record {
                    PriceSampleTxOps::insert(&mut tx, &item.id, new_price, now).await?;
                }

                tx.commit().await?;
                Ok((old_price, changed, record))
            })
            .await?;

        let mut outcome = UpdateOutcome {
            changed,
            skipped: false,
            sample_recorded,
            notified: false,
        };

        // No alert for a first observation.
        let change = if changed {
            old_price.and_then(|old| PriceChange::new(old, new_price))
        } else {
            None
        };
        if let Some(change) = change {
            info!(
                direction = %change.direction,
                old_price = change.old_price,
                new_price = change.new_price,
                "Price changed for {}",
                result.title
            );
            let alert = PriceAlert::new(item, change)
                .with_display(&result.title, result.image_url.as_deref());
            self.dispatcher.dispatch(item, alert);
            outcome.notified = true;
        } else {
            debug!(changed, sample_recorded, "Price check applied");
        }

        Ok(outcome)
    }
}
