//! Retry scheduler for failed scrapes
//!
//! Runs one check immediately, then one per tick. A check asks storage for
//! failed articles still under the retry ceiling and re-queues each of them.
//! A token that does not fit in the queue is simply picked up again on the
//! next tick; the scheduler never waits for the queue to drain.

use crate::queue::Producer;
use crate::state::ScrapeStatus;
use crate::storage::ArticleStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Result of one check-and-requeue pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequeueReport {
    /// Eligible failed articles found in storage
    pub found: usize,

    /// Tokens accepted by the queue
    pub requeued: usize,

    /// Tokens the queue rejected (full or closed)
    pub dropped: usize,
}

pub struct RetryScheduler {
    store: Arc<dyn ArticleStore>,
    producer: Arc<dyn Producer>,
    interval: Duration,
    max_retries: u32,
}

impl RetryScheduler {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        producer: Arc<dyn Producer>,
        interval: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            store,
            producer,
            interval,
            max_retries,
        }
    }

    /// Runs the scheduler until `cancel` fires
    ///
    /// Cancellation is observed between passes; a pass that has started
    /// always finishes.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            "Retry scheduler started (interval: {:?}, max retries: {})",
            self.interval,
            self.max_retries
        );

        self.check_and_requeue();

        let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Retry scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.check_and_requeue();
                }
            }
        }
    }

    /// Re-queues every failed article that is still under the retry ceiling
    pub fn check_and_requeue(&self) -> RequeueReport {
        tracing::debug!("Checking for failed scrape tasks");

        let failed = match self.store.find_failed_scrapes(self.max_retries) {
            Ok(failed) => failed,
            Err(e) => {
                tracing::error!("Failed to query failed scrapes: {}", e);
                return RequeueReport::default();
            }
        };

        // Ceiling is enforced here as well as in the store query
        let failed: Vec<_> = failed
            .into_iter()
            .filter(|article| {
                let eligible = ScrapeStatus::Failed
                    .is_retry_eligible(article.retry_count, self.max_retries);
                if !eligible {
                    tracing::warn!(
                        "Skipping article {}: {} attempts already reached the retry ceiling",
                        article.id,
                        article.retry_count
                    );
                }
                eligible
            })
            .collect();

        let mut report = RequeueReport {
            found: failed.len(),
            ..RequeueReport::default()
        };

        for article in &failed {
            match self.producer.produce(&article.id.to_string()) {
                Ok(()) => {
                    tracing::debug!(
                        "Re-queued article {} (attempt {} of {})",
                        article.id,
                        article.retry_count + 1,
                        self.max_retries
                    );
                    report.requeued += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to re-queue article {}: {}", article.id, e);
                    report.dropped += 1;
                }
            }
        }

        if report.found > 0 {
            tracing::info!(
                "Retry pass: {} failed, {} re-queued, {} deferred to next tick",
                report.found,
                report.requeued,
                report.dropped
            );
        }

        report
    }
}
