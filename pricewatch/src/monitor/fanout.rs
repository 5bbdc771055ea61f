//! Bounded-concurrency fan-out of one price check per item.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::processor::{PriceUpdateProcessor, UpdateOutcome};
use crate::Result;
use crate::domain::MonitoredItem;
use crate::source::ProductSource;

/// Summary of one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub success_count: usize,
    pub fail_count: usize,
    /// Successful checks that saw a price change.
    pub changed_count: usize,
    pub duration: Duration,
}

impl CycleReport {
    pub fn total(&self) -> usize {
        self.success_count + self.fail_count
    }
}

pub struct FanOutExecutor {
    source: Arc<dyn ProductSource>,
    processor: Arc<PriceUpdateProcessor>,
    semaphore: Arc<Semaphore>,
    max_concurrency: usize,
}

impl FanOutExecutor {
    pub fn new(
        source: Arc<dyn ProductSource>,
        processor: Arc<PriceUpdateProcessor>,
        max_concurrency: usize,
    ) -> Self {
        let max_concurrency = max_concurrency.max(1);
        Self {
            source,
            processor,
            semaphore: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Check every item and wait for all of them.
    ///
    /// At most `max_concurrency` fetches are in flight. Per-item failures are
    /// logged and counted; nothing is propagated.
    pub async fn run_cycle(&self, items: Vec<MonitoredItem>) -> CycleReport {
        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for item in items {
            let source = self.source.clone();
            let processor = self.processor.clone();
            let semaphore = self.semaphore.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let outcome = check_item(source.as_ref(), &processor, &item).await;
                (item.id, outcome)
            });
        }

        let mut report = CycleReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(outcome))) if !outcome.skipped => {
                    report.success_count += 1;
                    if outcome.changed {
                        report.changed_count += 1;
                    }
                }
                Ok((item_id, Ok(_))) => {
                    warn!(item_id = %item_id, "Price check skipped: invalid fetch result");
                    report.fail_count += 1;
                }
                Ok((item_id, Err(e))) => {
                    warn!(item_id = %item_id, error = %e, "Price check failed");
                    report.fail_count += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Price check task aborted");
                    report.fail_count += 1;
                }
            }
        }

        report.duration = started.elapsed();
        info!(
            success = report.success_count,
            failed = report.fail_count,
            changed = report.changed_count,
            "Price check cycle finished in {:?}",
            report.duration
        );
        report
    }
}

/// Fetch one item and apply the result.
pub async fn check_item(
    source: &dyn ProductSource,
    processor: &PriceUpdateProcessor,
    item: &MonitoredItem,
) -> Result<UpdateOutcome> {
    debug!(item_id = %item.id, url = %item.url, "Checking price");
    let result = source.fetch(&item.url).await?;
    processor.apply(item, &result).await
}
