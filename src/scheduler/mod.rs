//! Scheduled alert checks
//!
//! Long-lived background task: once per cycle it fetches a single
//! vault snapshot, evaluates every due subscription against it, and
//! records each evaluation in the store.


use crate::feed::FeedSource;
use crate::report;
use crate::store::SubscriptionStore;
use crate::telegram::Transport;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct Scheduler {
    feed: Arc<dyn FeedSource>,
    store: Arc<SubscriptionStore>,
    transport: Arc<dyn Transport>,
    cycle: Duration,
}

impl Scheduler {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        store: Arc<SubscriptionStore>,
        transport: Arc<dyn Transport>,
        cycle: Duration,
    ) -> Self {
        Self {
            feed,
            store,
            transport,
            cycle,
        }
    }

    /// Run forever, one cycle per period
    pub async fn run(self) {
        info!(
            "scheduler started, cycle={}s, {} subscription(s) loaded",
            self.cycle.as_secs(),
            self.store.len()
        );

        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.cycle).await;
        }
    }

    /// One evaluation pass at the current time
    pub async fn run_cycle(&self) {
        self.run_cycle_at(Utc::now()).await;
    }

    /// One evaluation pass over all subscriptions.
    ///
    /// A fetch failure skips the entire cycle: no subscription is
    /// touched, so every due subscriber is re-evaluated next time.
    pub async fn run_cycle_at(&self, now: chrono::DateTime<Utc>) {
        let snapshot = match self.feed.fetch().await {
            Ok(s) => s,
            Err(e) => {
                warn!("feed fetch failed, skipping cycle: {}", e);
                return;
            }
        };

        for (key, config) in self.store.all() {
            if !config.is_due(now) {
                continue;
            }

            // Silent on zero matches: nobody is waiting on a scheduled
            // check, unlike the on-demand path.
            if let Some(text) = report::render_alert(&snapshot, f64::from(config.threshold)) {
                if let Err(e) = self.transport.send_report(key.user_id, &text).await {
                    warn!("delivery to user {} failed: {}", key.user_id, e);
                }
            } else {
                debug!(
                    "no pools above {}% for user {}",
                    config.threshold, key.user_id
                );
            }

            // Touch with the cycle's evaluation time, whether or not a
            // message went out. On a crash before this point the
            // subscriber is simply evaluated again next cycle.
            if let Err(e) = self.store.touch(key, now) {
                warn!("failed to persist last-check for {:?}: {}", key, e);
            }
        }
    }
}
