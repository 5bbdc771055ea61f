//! Single-flight pipeline scheduler.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SchedulerConfig;
use crate::database::repositories::ItemRepository;
use crate::domain::MonitoredItem;
use crate::monitor::{CycleReport, FanOutExecutor};
use crate::source::ProductSource;

/// Result of a cycle request.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(CycleReport),
    /// Another cycle was active; this trigger was dropped.
    SkippedAlreadyRunning,
    /// The fetch endpoint failed its liveness probe.
    SkippedSourceUnavailable,
    /// Items could not be loaded.
    Aborted(String),
}

/// Result of a manual trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    AlreadyRunning,
}

/// Clears the running flag when the cycle ends, however it ends.
struct RunGuard {
    running: Arc<AtomicBool>,
    idle: Arc<Notify>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.idle.notify_waiters();
    }
}

pub struct PipelineScheduler {
    items: Arc<dyn ItemRepository>,
    source: Arc<dyn ProductSource>,
    executor: Arc<FanOutExecutor>,
    config: SchedulerConfig,
    running: Arc<AtomicBool>,
    idle: Arc<Notify>,
    last_report: Mutex<Option<CycleReport>>,
}

impl PipelineScheduler {
    pub fn new(
        items: Arc<dyn ItemRepository>,
        source: Arc<dyn ProductSource>,
        executor: Arc<FanOutExecutor>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            items,
            source,
            executor,
            config,
            running: Arc::new(AtomicBool::new(false)),
            idle: Arc::new(Notify::new()),
            last_report: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn last_report(&self) -> Option<CycleReport> {
        *self.last_report.lock()
    }

    fn try_begin(&self) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: self.running.clone(),
                idle: self.idle.clone(),
            })
    }

    /// Run one cycle now and wait for it, unless one is already active.
    pub async fn run_scheduled(&self) -> CycleOutcome {
        let Some(guard) = self.try_begin() else {
            info!("Price check cycle already running; trigger ignored");
            return CycleOutcome::SkippedAlreadyRunning;
        };
        self.run_guarded(guard).await
    }

    /// Start a cycle in the background and return immediately.
    ///
    /// The running flag is taken before this returns, so a trigger that races
    /// with an active cycle is always reported as [`TriggerOutcome::AlreadyRunning`].
    pub fn run_manual(self: &Arc<Self>) -> TriggerOutcome {
        let outcome = self.spawn_cycle();
        match outcome {
            TriggerOutcome::Started => info!("Manual price check cycle started"),
            TriggerOutcome::AlreadyRunning => {
                info!("Manual trigger ignored: price check cycle already running")
            }
        }
        outcome
    }

    /// Take the running flag, then run the cycle on a detached task.
    ///
    /// [`wait_idle`](Self::wait_idle) observes the cycle from the moment this
    /// returns [`TriggerOutcome::Started`].
    fn spawn_cycle(self: &Arc<Self>) -> TriggerOutcome {
        let Some(guard) = self.try_begin() else {
            return TriggerOutcome::AlreadyRunning;
        };

        let this = self.clone();
        tokio::spawn(async move {
            let outcome = this.run_guarded(guard).await;
            debug!(?outcome, "Price check cycle finished");
        });
        TriggerOutcome::Started
    }

    async fn run_guarded(&self, _guard: RunGuard) -> CycleOutcome {
        if !self.source.is_available().await {
            warn!("Fetch endpoint unavailable; skipping price check cycle");
            return CycleOutcome::SkippedSourceUnavailable;
        }

        let items: Vec<MonitoredItem> = match self.items.list_items().await {
            Ok(rows) => rows.into_iter().map(MonitoredItem::from).collect(),
            Err(e) => {
                warn!(error = %e, "Failed to load monitored items; skipping cycle");
                return CycleOutcome::Aborted(e.to_string());
            }
        };

        info!(items = items.len(), "Starting price check cycle");
        let report = self.executor.run_cycle(items).await;
        *self.last_report.lock() = Some(report);
        CycleOutcome::Completed(report)
    }

    /// Wait until no cycle is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }

    /// Run cycles on the configured interval until `cancel` fires.
    ///
    /// A cycle in progress when `cancel` fires is allowed to finish; callers
    /// can use [`wait_idle`](Self::wait_idle) to wait for it.
    pub fn start(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let this = self.clone();
        let period = self.config.check_interval;
        let first_tick = if self.config.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + period
        };

        tokio::spawn(async move {
            let mut ticker = interval_at(first_tick, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            info!(
                "Price check scheduler started (interval: {:?}, run on startup: {})",
                period, this.config.run_on_startup
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Price check scheduler shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        // Detached so cancellation never interrupts a running cycle.
                        if this.spawn_cycle() == TriggerOutcome::AlreadyRunning {
                            info!("Price check cycle already running; tick skipped");
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repositories::{SqlxItemRepository, SqlxUserRepository};
    use crate::database::{init_pool_with_size, run_migrations};
    use crate::domain::PriceRules;
    use crate::monitor::PriceUpdateProcessor;
    use crate::notification::NotificationDispatcher;
    use crate::source::{FetchError, FetchResult};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Source whose liveness probe blocks until released.
    struct GatedSource {
        available: bool,
        gate: Notify,
        probes: AtomicUsize,
    }

    #[async_trait]
    impl ProductSource for GatedSource {
        async fn fetch(&self, _url: &str) -> Result<FetchResult, FetchError> {
            Ok(FetchResult::new("Widget", 10.0))
        }
        async fn is_available(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.available
        }
    }

    async fn scheduler(available: bool) -> (Arc<PipelineScheduler>, Arc<GatedSource>) {
        scheduler_with(available, false).await
    }

    async fn scheduler_with(
        available: bool,
        run_on_startup: bool,
    ) -> (Arc<PipelineScheduler>, Arc<GatedSource>) {
        let pool = init_pool_with_size("sqlite::memory:", 1).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let source = Arc::new(GatedSource {
            available,
            gate: Notify::new(),
            probes: AtomicUsize::new(0),
        });
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Vec::new(),
        ));
        let processor = Arc::new(PriceUpdateProcessor::new(
            pool.clone(),
            PriceRules::default(),
            dispatcher,
        ));
        let executor = Arc::new(FanOutExecutor::new(source.clone(), processor, 2));
        let scheduler = Arc::new(PipelineScheduler::new(
            Arc::new(SqlxItemRepository::new(pool.clone(), pool)),
            source.clone(),
            executor,
            SchedulerConfig {
                check_interval: Duration::from_secs(3600),
                run_on_startup,
            },
        ));
        (scheduler, source)
    }

    async fn wait_for_probe(source: &GatedSource) {
        while source.probes.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_second_trigger_is_dropped_while_running() {
        let (scheduler, source) = scheduler(true).await;

        let first = {
            let s = scheduler.clone();
            tokio::spawn(async move { s.run_scheduled().await })
        };
        wait_for_probe(&source).await;

        assert!(scheduler.is_running());
        assert_eq!(scheduler.run_manual(), TriggerOutcome::AlreadyRunning);
        assert_eq!(
            scheduler.run_scheduled().await,
            CycleOutcome::SkippedAlreadyRunning
        );

        source.gate.notify_one();
        let outcome = first.await.unwrap();
        assert!(matches!(outcome, CycleOutcome::Completed(r) if r.total() == 0));
        assert!(!scheduler.is_running());
        assert_eq!(source.probes.load(Ordering::SeqCst), 1);
        assert!(scheduler.last_report().is_some());
    }

    #[tokio::test]
    async fn test_unavailable_source_skips_cycle() {
        let (scheduler, source) = scheduler(false).await;
        source.gate.notify_one();
        assert_eq!(
            scheduler.run_scheduled().await,
            CycleOutcome::SkippedSourceUnavailable
        );
        assert!(!scheduler.is_running());
        assert!(scheduler.last_report().is_none());
    }

    #[tokio::test]
    async fn test_spawned_cycle_is_visible_before_it_is_polled() {
        let (scheduler, source) = scheduler(true).await;

        // No await between the spawn and the check: the detached task has not run.
        assert_eq!(scheduler.spawn_cycle(), TriggerOutcome::Started);
        assert!(scheduler.is_running());
        assert_eq!(source.probes.load(Ordering::SeqCst), 0);

        let waiter = {
            let s = scheduler.clone();
            tokio::spawn(async move { s.wait_idle().await })
        };
        wait_for_probe(&source).await;
        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        source.gate.notify_one();
        waiter.await.unwrap();
        assert!(!scheduler.is_running());
        assert!(scheduler.last_report().is_some());
    }

    #[tokio::test]
    async fn test_cancelled_loop_leaves_running_cycle_to_finish() {
        let (scheduler, source) = scheduler_with(true, true).await;

        let cancel = CancellationToken::new();
        let handle = scheduler.start(cancel.clone());
        while !scheduler.is_running() {
            tokio::task::yield_now().await;
        }
        cancel.cancel();
        handle.await.unwrap();

        assert!(scheduler.is_running());
        source.gate.notify_one();
        scheduler.wait_idle().await;
        assert!(matches!(
            scheduler.last_report(),
            Some(report) if report.total() == 0
        ));
    }

    #[tokio::test]
    async fn test_manual_trigger_runs_in_background() {
        let (scheduler, source) = scheduler(true).await;

        assert_eq!(scheduler.run_manual(), TriggerOutcome::Started);
        assert!(scheduler.is_running());
        wait_for_probe(&source).await;

        source.gate.notify_one();
        scheduler.wait_idle().await;
        assert!(!scheduler.is_running());
        assert!(scheduler.last_report().is_some());
    }
}
