//! Scrape workers
//!
//! A fixed number of worker loops pull article identifiers from the task
//! queue. Each identifier drives one scrape cycle:
//!
//! 1. Parse the token as an article UUID (malformed tokens are discarded)
//! 2. Resolve the article in storage (missing articles are discarded)
//! 3. Fetch the page under a deadline anchored at the start of the cycle
//! 4. Persist metadata on success, or mark the article failed
//!
//! Nothing is reported back to whoever queued the token. Two workers may hold
//! tokens for the same article at once; their writes are not ordered.

use crate::fetcher::Fetcher;
use crate::queue::Consumer;
use crate::storage::{ArticleStore, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

/// How a single scrape cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Metadata stored, article marked success
    Scraped,

    /// Fetch failed, article marked failed and its retry count incremented
    Failed,

    /// Token was not an article identifier; nothing written
    MalformedToken,

    /// Article no longer exists; nothing written
    NotFound,

    /// Storage rejected a read or write; nothing further attempted
    StorageError,
}

/// Executes scrape cycles against a store and a fetcher
#[derive(Clone)]
pub struct ScrapeWorker {
    store: Arc<dyn ArticleStore>,
    fetcher: Arc<dyn Fetcher>,
    task_timeout: Duration,
}

impl ScrapeWorker {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        fetcher: Arc<dyn Fetcher>,
        task_timeout: Duration,
    ) -> Self {
        Self {
            store,
            fetcher,
            task_timeout,
        }
    }

    /// Runs one scrape cycle for `token`
    ///
    /// Never returns an error: every failure is logged and folded into the
    /// returned outcome so the calling loop can keep going.
    pub async fn process_token(&self, token: &str) -> CycleOutcome {
        let deadline = Instant::now() + self.task_timeout;

        let id = match Uuid::parse_str(token) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Discarding malformed task token '{}': {}", token, e);
                return CycleOutcome::MalformedToken;
            }
        };

        let article = match self.store.find_by_id(id) {
            Ok(article) => article,
            Err(StorageError::ArticleNotFound(_)) => {
                tracing::info!("Article {} no longer exists, discarding task", id);
                return CycleOutcome::NotFound;
            }
            Err(e) => {
                tracing::error!("Failed to load article {}: {}", id, e);
                return CycleOutcome::StorageError;
            }
        };

        tracing::debug!(
            "Scraping article {} ({}), previous attempts: {}",
            id,
            article.url,
            article.retry_count
        );

        match self.fetcher.fetch(&article.url, deadline).await {
            Ok(metadata) => match self.store.update_metadata(id, &metadata) {
                Ok(()) => {
                    tracing::info!("Scraped article {}: {:?}", id, metadata.title);
                    CycleOutcome::Scraped
                }
                Err(e) => {
                    tracing::error!("Failed to store metadata for article {}: {}", id, e);
                    CycleOutcome::StorageError
                }
            },
            Err(fetch_error) => {
                tracing::warn!("Failed to scrape article {}: {}", id, fetch_error);
                match self.store.mark_scrape_failed(id, &fetch_error.to_string()) {
                    Ok(()) => CycleOutcome::Failed,
                    Err(e) => {
                        tracing::error!("Failed to mark article {} as failed: {}", id, e);
                        CycleOutcome::StorageError
                    }
                }
            }
        }
    }
}

/// A fixed-size pool of worker loops sharing one consumer
pub struct WorkerPool {
    worker: ScrapeWorker,
    consumer: Arc<dyn Consumer>,
    worker_count: usize,
}

impl WorkerPool {
    pub fn new(worker: ScrapeWorker, consumer: Arc<dyn Consumer>, worker_count: usize) -> Self {
        Self {
            worker,
            consumer,
            worker_count,
        }
    }

    /// Spawns every worker loop on `tracker`
    ///
    /// The loops end on their own once the queue is closed and drained.
    pub fn spawn(self, tracker: &TaskTracker) {
        tracing::info!("Starting {} scrape workers", self.worker_count);

        for index in 0..self.worker_count {
            tracker.spawn(run_worker(
                index,
                self.worker.clone(),
                Arc::clone(&self.consumer),
            ));
        }
    }
}

/// One worker loop: consume tokens until the queue ends
///
/// Each cycle runs in its own task so a panic inside a cycle only loses that
/// token.
pub async fn run_worker(index: usize, worker: ScrapeWorker, consumer: Arc<dyn Consumer>) -> usize {
    tracing::debug!("Worker #{} started", index);
    let mut processed = 0;

    while let Some(token) = consumer.next().await {
        let cycle_worker = worker.clone();
        let cycle = tokio::spawn(async move { cycle_worker.process_token(&token).await });

        if let Err(e) = cycle.await {
            tracing::error!("Worker #{} scrape cycle aborted: {}", index, e);
        }
        processed += 1;
    }

    tracing::debug!("Worker #{} stopped after {} tasks", index, processed);
    processed
}
