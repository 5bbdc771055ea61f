//! End-to-end tests for the price check pipeline.
//!
//! Everything runs against an in-memory SQLite database with the real schema;
//! only the product source and the outbound channel are scripted.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use pricewatch::config::{ItemConfig, SchedulerConfig};
use pricewatch::database::models::{ItemStatus, MonitoredItemDbModel, UserDbModel};
use pricewatch::database::repositories::*;
use pricewatch::database::{DbPool, init_pool_with_size, run_migrations};
use pricewatch::domain::{MonitoredItem, PriceDirection, PriceRules};
use pricewatch::items::ItemService;
use pricewatch::monitor::{FanOutExecutor, PriceUpdateProcessor};
use pricewatch::notification::{
    FeedChannel, NotificationChannel, NotificationDispatcher, PriceAlert,
};
use pricewatch::scheduler::{CycleOutcome, PipelineScheduler, TriggerOutcome};
use pricewatch::source::{FetchError, FetchResult, ProductSource};

#[derive(Clone, Copy)]
enum Scripted {
    Price(f64),
    Invalid,
}

/// Product source answering from a per-URL script. Unknown URLs are unreachable.
#[derive(Default)]
struct ScriptedSource {
    responses: Mutex<HashMap<String, Scripted>>,
    unavailable: AtomicBool,
    hold: AtomicBool,
    release: Notify,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    fn set(&self, url: &str, response: Scripted) {
        self.responses.lock().insert(url.to_string(), response);
    }
}

#[async_trait]
impl ProductSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        let scripted = self.responses.lock().get(url).copied();
        match scripted {
            Some(Scripted::Price(price)) => Ok(FetchResult::new("Blue Widget", price)),
            Some(Scripted::Invalid) => Ok(FetchResult::new("Blue Widget", 0.0)),
            None => Err(FetchError::unreachable(url, 3, "HTTP 503")),
        }
    }

    async fn is_available(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

/// Outbound channel that records every alert it is asked to send.
#[derive(Default)]
struct RecordingChannel {
    alerts: Mutex<Vec<(String, PriceAlert)>>,
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    fn channel_type(&self) -> &'static str {
        "recording"
    }
    fn is_enabled(&self) -> bool {
        true
    }
    fn recipient(&self, user: &UserDbModel) -> Option<String> {
        Some(user.email.clone())
    }
    async fn send(&self, recipient: &str, alert: &PriceAlert) -> pricewatch::Result<()> {
        self.alerts
            .lock()
            .push((recipient.to_string(), alert.clone()));
        Ok(())
    }
}

struct Harness {
    pool: DbPool,
    user: UserDbModel,
    items: Arc<SqlxItemRepository>,
    samples: Arc<SqlxPriceSampleRepository>,
    feed: Arc<SqlxFeedRepository>,
    source: Arc<ScriptedSource>,
    outbound: Arc<RecordingChannel>,
    dispatcher: Arc<NotificationDispatcher>,
    processor: Arc<PriceUpdateProcessor>,
    executor: Arc<FanOutExecutor>,
    scheduler: Arc<PipelineScheduler>,
    service: ItemService,
}

impl Harness {
    async fn new() -> Self {
        let pool = init_pool_with_size("sqlite::memory:", 1)
            .await
            .expect("Failed to create test pool");
        run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = Arc::new(SqlxUserRepository::new(pool.clone()));
        let user = UserDbModel::new("owner@example.com", "Owner");
        users.create_user(&user).await.expect("create user");

        let items = Arc::new(SqlxItemRepository::new(pool.clone(), pool.clone()));
        let samples = Arc::new(SqlxPriceSampleRepository::new(pool.clone(), pool.clone()));
        let feed = Arc::new(SqlxFeedRepository::new(pool.clone()));
        let source = Arc::new(ScriptedSource::default());
        let outbound = Arc::new(RecordingChannel::default());

        let channels: Vec<Arc<dyn NotificationChannel>> =
            vec![Arc::new(FeedChannel::new(feed.clone())), outbound.clone()];
        let dispatcher = Arc::new(NotificationDispatcher::new(users, channels));
        let processor = Arc::new(PriceUpdateProcessor::new(
            pool.clone(),
            PriceRules::default(),
            dispatcher.clone(),
        ));
        let executor = Arc::new(FanOutExecutor::new(source.clone(), processor.clone(), 4));
        let scheduler = Arc::new(PipelineScheduler::new(
            items.clone(),
            source.clone(),
            executor.clone(),
            SchedulerConfig {
                check_interval: Duration::from_secs(3600),
                run_on_startup: false,
            },
        ));
        let service = ItemService::new(
            items.clone(),
            samples.clone(),
            source.clone(),
            processor.clone(),
            ItemConfig {
                initial_fetch_timeout: Duration::from_secs(5),
            },
        );

        Self {
            pool,
            user,
            items,
            samples,
            feed,
            source,
            outbound,
            dispatcher,
            processor,
            executor,
            scheduler,
            service,
        }
    }

    /// Insert an item and, when `price` is given, record it as the first observation.
    async fn seed_item(&self, url: &str, price: Option<f64>) -> MonitoredItem {
        let model = MonitoredItemDbModel::new(&self.user.id, url, "Widget");
        self.items.create_item(&model).await.expect("create item");
        let item = MonitoredItem::from(model);

        if let Some(price) = price {
            let outcome = self
                .processor
                .apply(&item, &FetchResult::new("Blue Widget", price))
                .await
                .expect("seed price");
            assert!(outcome.changed);
            assert!(!outcome.notified);
        }
        self.reload(&item.id).await
    }

    async fn reload(&self, id: &str) -> MonitoredItem {
        MonitoredItem::from(self.items.get_item(id).await.expect("get item"))
    }

    async fn sample_count(&self, id: &str) -> i64 {
        self.samples.count_for_item(id).await.expect("count samples")
    }

    /// Move every sample of `id` back in time.
    async fn age_samples(&self, id: &str, hours: i64) {
        sqlx::query("UPDATE price_samples SET recorded_at = recorded_at - ? WHERE item_id = ?")
            .bind(hours * 60 * 60 * 1000)
            .bind(id)
            .execute(&self.pool)
            .await
            .expect("age samples");
    }
}

mod processor_tests {
    use super::*;

    #[tokio::test]
    async fn test_price_drop_updates_item_and_notifies() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/blue-widget";
        let item = h.seed_item(url, Some(100.0)).await;
        h.source.set(url, Scripted::Price(85.0));

        let report = h.executor.run_cycle(vec![item.clone()]).await;
        assert_eq!(report.success_count, 1);
        assert_eq!(report.fail_count, 0);
        assert_eq!(report.changed_count, 1);

        let item = h.reload(&item.id).await;
        assert_eq!(item.previous_price, Some(100.0));
        assert_eq!(item.current_price, Some(85.0));
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.name, "Blue Widget");
        assert!(item.last_checked_at.is_some());
        assert_eq!(h.sample_count(&item.id).await, 2);

        h.dispatcher.wait_idle().await;
        let alerts = h.outbound.alerts.lock().clone();
        assert_eq!(alerts.len(), 1);
        let (recipient, alert) = &alerts[0];
        assert_eq!(recipient, "owner@example.com");
        assert_eq!(alert.direction, PriceDirection::Drop);
        assert!((alert.amount() - 15.0).abs() < 1e-9);
        assert!((alert.percent() - 15.0).abs() < 1e-9);

        let feed = h.feed.list_for_user(&h.user.id, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, "PRICE_DROP");
        assert_eq!(feed[0].old_price, Some(100.0));
        assert_eq!(feed[0].new_price, Some(85.0));
        assert!(!feed[0].is_read);
    }

    #[tokio::test]
    async fn test_unchanged_price_is_sampled_once_per_window() {
        let h = Harness::new().await;
        let item = h.seed_item("https://shop.example.com/a", Some(100.0)).await;

        let same = FetchResult::new("Blue Widget", 100.0);
        let outcome = h.processor.apply(&item, &same).await.unwrap();
        assert!(!outcome.changed);
        assert!(!outcome.sample_recorded);
        assert_eq!(h.sample_count(&item.id).await, 1);

        // Sub-tolerance noise is not a change either.
        let item = h.reload(&item.id).await;
        let noisy = FetchResult::new("Blue Widget", 100.009);
        let outcome = h.processor.apply(&item, &noisy).await.unwrap();
        assert!(!outcome.changed);
        assert_eq!(h.sample_count(&item.id).await, 1);

        h.age_samples(&item.id, 13).await;
        let item = h.reload(&item.id).await;
        let outcome = h.processor.apply(&item, &same).await.unwrap();
        assert!(!outcome.changed);
        assert!(outcome.sample_recorded);
        assert_eq!(h.sample_count(&item.id).await, 2);

        h.dispatcher.wait_idle().await;
        assert!(h.outbound.alerts.lock().is_empty());
        assert_eq!(h.dispatcher.stats().dispatched, 0);
    }

    #[tokio::test]
    async fn test_previous_price_survives_unchanged_cycles() {
        let h = Harness::new().await;
        let item = h.seed_item("https://shop.example.com/a", Some(100.0)).await;

        h.processor
            .apply(&item, &FetchResult::new("Blue Widget", 90.0))
            .await
            .unwrap();
        let item = h.reload(&item.id).await;
        h.processor
            .apply(&item, &FetchResult::new("Blue Widget", 90.0))
            .await
            .unwrap();

        let item = h.reload(&item.id).await;
        assert_eq!(item.previous_price, Some(100.0));
        assert_eq!(item.current_price, Some(90.0));
    }

    #[tokio::test]
    async fn test_replaying_same_result_is_idempotent() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        let item = h.seed_item(url, Some(100.0)).await;
        h.source.set(url, Scripted::Price(85.0));

        h.executor.run_cycle(vec![item.clone()]).await;
        let item = h.reload(&item.id).await;
        h.executor.run_cycle(vec![item.clone()]).await;

        assert_eq!(h.sample_count(&item.id).await, 2);
        h.dispatcher.wait_idle().await;
        assert_eq!(h.outbound.alerts.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_first_observation_records_sample_without_alert() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/new";
        let item = h.seed_item(url, None).await;
        assert_eq!(item.status, ItemStatus::Pending);
        h.source.set(url, Scripted::Price(42.0));

        let report = h.executor.run_cycle(vec![item.clone()]).await;
        assert_eq!(report.success_count, 1);

        let item = h.reload(&item.id).await;
        assert_eq!(item.current_price, Some(42.0));
        assert_eq!(item.previous_price, None);
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(h.sample_count(&item.id).await, 1);

        h.dispatcher.wait_idle().await;
        assert!(h.outbound.alerts.lock().is_empty());
        assert!(h.feed.list_for_user(&h.user.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_result_leaves_item_untouched() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        let item = h.seed_item(url, Some(100.0)).await;
        h.source.set(url, Scripted::Invalid);

        let report = h.executor.run_cycle(vec![item.clone()]).await;
        assert_eq!(report.success_count, 0);
        assert_eq!(report.fail_count, 1);

        assert_eq!(h.reload(&item.id).await, item);
        assert_eq!(h.sample_count(&item.id).await, 1);
        h.dispatcher.wait_idle().await;
        assert!(h.outbound.alerts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_apply_uses_stored_prices_not_the_cycle_snapshot() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        let snapshot = h.seed_item(url, Some(100.0)).await;

        // A refresh writes 85 while a cycle still holds the snapshot taken at 100.
        h.source.set(url, Scripted::Price(85.0));
        assert!(h.service.refresh_item(&snapshot.id).await.unwrap().changed);

        let late = FetchResult::new("Blue Widget Pro", 100.0);
        let outcome = h.processor.apply(&snapshot, &late).await.unwrap();
        assert!(outcome.changed);
        assert!(outcome.sample_recorded);
        assert!(outcome.notified);

        let item = h.reload(&snapshot.id).await;
        assert_eq!(item.current_price, Some(100.0));
        assert_eq!(item.previous_price, Some(85.0));
        assert_eq!(h.sample_count(&item.id).await, 3);

        h.dispatcher.wait_idle().await;
        let feed = h.feed.list_for_user(&h.user.id, 10).await.unwrap();
        let increase = feed
            .iter()
            .find(|entry| entry.kind == "PRICE_INCREASE")
            .expect("increase entry");
        assert_eq!(increase.old_price, Some(85.0));
        assert_eq!(increase.new_price, Some(100.0));
        assert!(increase.message.starts_with("Blue Widget Pro went up"));
    }

    #[tokio::test]
    async fn test_increase_reaches_feed_but_not_opted_out_channel() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        let item = h.seed_item(url, Some(100.0)).await;
        assert!(!item.notify_on_increase);
        h.source.set(url, Scripted::Price(120.0));

        h.executor.run_cycle(vec![item]).await;
        h.dispatcher.wait_idle().await;

        assert!(h.outbound.alerts.lock().is_empty());
        let feed = h.feed.list_for_user(&h.user.id, 10).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, "PRICE_INCREASE");
    }
}

mod fanout_tests {
    use super::*;

    #[tokio::test]
    async fn test_one_failure_does_not_stop_the_batch() {
        let h = Harness::new().await;
        let mut batch = Vec::new();
        for i in 0..6 {
            let url = format!("https://shop.example.com/item-{i}");
            let item = h.seed_item(&url, Some(100.0)).await;
            if i != 3 {
                h.source.set(&url, Scripted::Price(80.0));
            }
            batch.push(item);
        }

        let report = h.executor.run_cycle(batch.clone()).await;
        assert_eq!(report.success_count, 5);
        assert_eq!(report.fail_count, 1);
        assert_eq!(report.total(), 6);

        let failed = h.reload(&batch[3].id).await;
        assert_eq!(failed.current_price, Some(100.0));
        let ok = h.reload(&batch[0].id).await;
        assert_eq!(ok.current_price, Some(80.0));
    }
}

mod concurrency_tests {
    use super::*;

    /// Source that records how many fetches overlap.
    #[derive(Default)]
    struct PeakSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl ProductSource for PeakSource {
        async fn fetch(&self, _url: &str) -> Result<FetchResult, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(FetchResult::new("Blue Widget", 90.0))
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_in_flight_fetches_never_exceed_the_cap() {
        let h = Harness::new().await;
        let mut batch = Vec::new();
        for i in 0..10 {
            let url = format!("https://shop.example.com/item-{i}");
            batch.push(h.seed_item(&url, Some(100.0)).await);
        }

        let source = Arc::new(PeakSource::default());
        let executor = FanOutExecutor::new(source.clone(), h.processor.clone(), 2);
        assert_eq!(executor.max_concurrency(), 2);

        let report = executor.run_cycle(batch).await;
        assert_eq!(report.total(), 10);
        assert_eq!(report.success_count, 10);
        assert_eq!(report.changed_count, 10);

        let peak = source.peak.load(Ordering::SeqCst);
        assert!(peak <= 2, "peak in-flight fetches was {peak}");
        assert!(peak >= 1);
        assert_eq!(source.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_zero_cap_is_raised_to_one() {
        let h = Harness::new().await;
        let executor = FanOutExecutor::new(h.source.clone(), h.processor.clone(), 0);
        assert_eq!(executor.max_concurrency(), 1);
    }
}

mod scheduler_tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_trigger_during_active_cycle_is_dropped() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        h.seed_item(url, Some(100.0)).await;
        h.source.set(url, Scripted::Price(90.0));
        h.source.hold.store(true, Ordering::SeqCst);

        assert_eq!(h.scheduler.run_manual(), TriggerOutcome::Started);
        while h.source.fetches.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert_eq!(h.scheduler.run_manual(), TriggerOutcome::AlreadyRunning);
        assert_eq!(
            h.scheduler.run_scheduled().await,
            CycleOutcome::SkippedAlreadyRunning
        );

        h.source.hold.store(false, Ordering::SeqCst);
        h.source.release.notify_one();
        h.scheduler.wait_idle().await;

        assert_eq!(h.source.fetches.load(Ordering::SeqCst), 1);
        let report = h.scheduler.last_report().expect("cycle report");
        assert_eq!(report.success_count, 1);
    }

    #[tokio::test]
    async fn test_unavailable_source_skips_whole_cycle() {
        let h = Harness::new().await;
        h.seed_item("https://shop.example.com/a", Some(100.0)).await;
        h.source.unavailable.store(true, Ordering::SeqCst);

        assert_eq!(
            h.scheduler.run_scheduled().await,
            CycleOutcome::SkippedSourceUnavailable
        );
        assert_eq!(h.source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scheduled_cycle_checks_every_item() {
        let h = Harness::new().await;
        for i in 0..3 {
            let url = format!("https://shop.example.com/item-{i}");
            h.seed_item(&url, None).await;
            h.source.set(&url, Scripted::Price(10.0 + i as f64));
        }

        let outcome = h.scheduler.run_scheduled().await;
        let CycleOutcome::Completed(report) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        assert_eq!(report.success_count, 3);
        assert_eq!(report.changed_count, 3);
    }
}

mod item_service_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_item_fetches_once_and_deduplicates() {
        let h = Harness::new().await;
        h.source
            .set("https://shop.example.com/blue-widget", Scripted::Price(59.9));

        let item = h
            .service
            .add_item(&h.user.id, "https://shop.example.com/blue-widget?utm_source=x#top")
            .await
            .unwrap();
        assert_eq!(item.url, "https://shop.example.com/blue-widget");
        assert_eq!(item.status, ItemStatus::Active);
        assert_eq!(item.current_price, Some(59.9));

        let again = h
            .service
            .add_item(&h.user.id, "https://shop.example.com/blue-widget")
            .await
            .unwrap();
        assert_eq!(again.id, item.id);
        assert_eq!(h.source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(h.items.list_items_for_user(&h.user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_item_stays_pending_when_fetch_fails() {
        let h = Harness::new().await;
        let item = h
            .service
            .add_item(&h.user.id, "https://shop.example.com/red-widget")
            .await
            .unwrap();
        assert_eq!(item.status, ItemStatus::Pending);
        assert_eq!(item.name, "Red Widget");
        assert_eq!(item.current_price, None);

        assert!(h.service.add_item(&h.user.id, "   ").await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_and_history() {
        let h = Harness::new().await;
        let url = "https://shop.example.com/a";
        let item = h.seed_item(url, Some(100.0)).await;
        h.source.set(url, Scripted::Price(95.0));

        let outcome = h.service.refresh_item(&item.id).await.unwrap();
        assert!(outcome.changed);

        let history = h.service.price_history(&item.id, None).await.unwrap();
        let prices: Vec<f64> = history.iter().map(|s| s.price).collect();
        assert_eq!(prices, vec![95.0, 100.0]);

        let limited = h.service.price_history(&item.id, Some(1)).await.unwrap();
        assert_eq!(limited.len(), 1);

        assert!(h.service.refresh_item("missing").await.is_err());
    }

    #[tokio::test]
    async fn test_cleanup_duplicate_history() {
        let h = Harness::new().await;
        let item = h.seed_item("https://shop.example.com/a", None).await;

        for (i, price) in [100.0, 100.0, 90.0, 90.0, 90.004, 100.0].iter().enumerate() {
            sqlx::query("INSERT INTO price_samples (item_id, price, recorded_at) VALUES (?, ?, ?)")
                .bind(&item.id)
                .bind(price)
                .bind(1_000 * i as i64)
                .execute(&h.pool)
                .await
                .unwrap();
        }

        let removed = h.service.cleanup_duplicate_history().await.unwrap();
        assert_eq!(removed, 3);

        let prices: Vec<f64> = h
            .service
            .price_history(&item.id, None)
            .await
            .unwrap()
            .iter()
            .map(|s| s.price)
            .collect();
        assert_eq!(prices, vec![100.0, 90.0, 100.0]);

        assert_eq!(h.service.cleanup_duplicate_history().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_analytics_counts_recent_changes() {
        let h = Harness::new().await;
        let recent = h.seed_item("https://shop.example.com/a", Some(100.0)).await;
        h.processor
            .apply(&recent, &FetchResult::new("Blue Widget", 85.0))
            .await
            .unwrap();
        h.processor
            .apply(&recent, &FetchResult::new("Blue Widget", 85.0))
            .await
            .unwrap();

        let old = h.seed_item("https://shop.example.com/b", Some(50.0)).await;
        h.processor
            .apply(&old, &FetchResult::new("Blue Widget", 40.0))
            .await
            .unwrap();
        h.age_samples(&old.id, 24 * 40).await;

        let report = h.service.analytics(&h.user.id, 30).await.unwrap();
        assert_eq!(report.days, 30);
        assert_eq!(report.total_items, 2);
        assert_eq!(report.total_changes, 1);
        assert_eq!(report.avg_changes_per_day, 0.0);
        assert_eq!(report.changes_by_date.len(), 1);
        assert_eq!(report.changes_by_hour.iter().sum::<u64>(), 1);
        assert_eq!(report.top_items.len(), 1);
        assert_eq!(report.top_items[0].item_id, recent.id);
        assert_eq!(report.top_items[0].item_name, "Blue Widget");

        let wider = h.service.analytics(&h.user.id, 60).await.unwrap();
        assert_eq!(wider.total_changes, 2);

        let stranger = h.service.analytics("someone-else", 30).await.unwrap();
        assert_eq!(stranger.total_changes, 0);
        assert_eq!(stranger.total_items, 0);

        assert!(h.service.analytics(&h.user.id, 0).await.is_err());
    }

    #[tokio::test]
    async fn test_remove_item_drops_history() {
        let h = Harness::new().await;
        let item = h.seed_item("https://shop.example.com/a", Some(100.0)).await;
        assert_eq!(h.sample_count(&item.id).await, 1);

        assert!(h.service.remove_item(&item.id).await.unwrap());
        assert_eq!(h.sample_count(&item.id).await, 0);
        assert!(!h.service.remove_item(&item.id).await.unwrap());
    }
}
