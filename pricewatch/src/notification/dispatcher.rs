//! Notification dispatcher.
//!
//! Resolves the owning user, applies per-item and per-user channel gating
//! and fans an alert out to every channel. Deliveries run on a
//! [`TaskTracker`] so the pipeline never waits on a channel; outcomes are
//! visible through logs and [`DispatchStats`].

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::join_all;
use serde::Serialize;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::channels::NotificationChannel;
use super::events::PriceAlert;
use crate::database::repositories::UserRepository;
use crate::domain::MonitoredItem;

/// Delivery counters since process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    pub dispatched: u64,
    pub sent: u64,
    pub failed: u64,
}

struct Inner {
    users: Arc<dyn UserRepository>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    dispatched: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
}

pub struct NotificationDispatcher {
    inner: Arc<Inner>,
    tracker: TaskTracker,
}

impl NotificationDispatcher {
    pub fn new(
        users: Arc<dyn UserRepository>,
        channels: Vec<Arc<dyn NotificationChannel>>,
    ) -> Self {
        let enabled: Vec<&str> = channels
            .iter()
            .filter(|c| c.is_enabled())
            .map(|c| c.channel_type())
            .collect();
        info!(channels = ?enabled, "Notification dispatcher initialized");

        Self {
            inner: Arc::new(Inner {
                users,
                channels,
                dispatched: AtomicU64::new(0),
                sent: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
            tracker: TaskTracker::new(),
        }
    }

    /// Queue delivery of `alert` for `item`. Returns immediately.
    pub fn dispatch(&self, item: &MonitoredItem, alert: PriceAlert) {
        let item_opted_in = item.wants(alert.direction);

        self.inner.dispatched.fetch_add(1, Ordering::Relaxed);
        let inner = self.inner.clone();
        self.tracker.spawn(async move {
            inner.deliver(alert, item_opted_in).await;
        });
    }

    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            dispatched: self.inner.dispatched.load(Ordering::Relaxed),
            sent: self.inner.sent.load(Ordering::Relaxed),
            failed: self.inner.failed.load(Ordering::Relaxed),
        }
    }

    /// Wait until every queued delivery has finished.
    pub async fn wait_idle(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

impl Inner {
    async fn deliver(&self, alert: PriceAlert, item_opted_in: bool) {
        let user = match self.users.get_user(&alert.user_id).await {
            Ok(user) => user,
            Err(e) => {
                warn!(
                    user_id = %alert.user_id,
                    item_id = %alert.item_id,
                    error = %e,
                    "Cannot resolve alert recipient"
                );
                self.failed.fetch_add(1, Ordering::Relaxed);
                return;
            }
        };

        let deliveries = self.channels.iter().filter_map(|channel| {
            if !channel.is_enabled() {
                return None;
            }
            if channel.requires_item_opt_in() && !item_opted_in {
                debug!(
                    channel = channel.channel_type(),
                    item_id = %alert.item_id,
                    direction = %alert.direction,
                    "Item not opted in for this direction"
                );
                return None;
            }
            let recipient = channel.recipient(&user)?;
            let alert = &alert;
            Some(async move {
                let result = channel.send(&recipient, alert).await;
                (channel.channel_type(), result)
            })
        });

        for (channel_type, result) in join_all(deliveries).await {
            match result {
                Ok(()) => {
                    self.sent.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        channel = channel_type,
                        item_id = %alert.item_id,
                        "Alert delivered"
                    );
                }
                Err(e) => {
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        channel = channel_type,
                        item_id = %alert.item_id,
                        error = %e,
                        "Alert delivery failed"
                    );
                }
            }
        }
    }
}
