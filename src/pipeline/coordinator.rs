//! Pipeline coordinator - wires the queue, worker pool and retry scheduler
//!
//! This module owns the lifecycle of the background scrape pipeline:
//! - Building the bounded task queue from configuration
//! - Spawning the worker pool and the retry scheduler
//! - Accepting new article submissions
//! - Graceful shutdown (stop the scheduler, close the queue, drain the workers)

use crate::config::PipelineConfig;
use crate::fetcher::Fetcher;
use crate::pipeline::retry::RetryScheduler;
use crate::pipeline::worker::{ScrapeWorker, WorkerPool};
use crate::queue::{ChannelProducer, ChannelQueue, Producer};
use crate::storage::{ArticleRecord, ArticleStore};
use crate::{PipelineError, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use url::Url;

/// A running scrape pipeline
pub struct Pipeline {
    store: Arc<dyn ArticleStore>,
    producer: ChannelProducer,
    cancel: CancellationToken,
    scheduler: JoinHandle<()>,
    tracker: TaskTracker,
}

impl Pipeline {
    /// Starts the worker pool and the retry scheduler
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        config: &PipelineConfig,
        store: Arc<dyn ArticleStore>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        let (producer, consumer) = ChannelQueue::bounded(config.queue_capacity);
        let cancel = CancellationToken::new();
        let tracker = TaskTracker::new();

        let worker = ScrapeWorker::new(Arc::clone(&store), fetcher, config.task_timeout());
        WorkerPool::new(worker, Arc::new(consumer), config.worker_count).spawn(&tracker);

        let scheduler = RetryScheduler::new(
            Arc::clone(&store),
            Arc::new(producer.clone()),
            config.scheduler_interval(),
            config.max_retries,
        );
        let scheduler_cancel = cancel.clone();
        let scheduler = tracker.spawn(async move { scheduler.run(scheduler_cancel).await });

        tracker.close();

        tracing::info!(
            "Pipeline started (queue capacity: {}, workers: {}, task timeout: {:?})",
            config.queue_capacity,
            config.worker_count,
            config.task_timeout()
        );

        Self {
            store,
            producer,
            cancel,
            scheduler,
            tracker,
        }
    }

    /// Stores a new pending article for `url` and queues it for scraping
    ///
    /// If the queue is full the article stays stored as `pending` and the
    /// queue error is returned. Such an article is not picked up by the
    /// retry scheduler, which only scans failed articles.
    pub fn submit(&self, url: &str) -> Result<ArticleRecord> {
        let url = validate_submission_url(url)?;
        let article = self.store.create_article(&url)?;

        if let Err(e) = self.producer.produce(&article.id.to_string()) {
            tracing::warn!("Article {} stored but not queued: {}", article.id, e);
            return Err(e.into());
        }

        tracing::debug!("Queued article {} for {}", article.id, article.url);
        Ok(article)
    }

    /// Stops the pipeline
    ///
    /// Waits for the scheduler to finish its current pass, closes the queue,
    /// then waits for the workers to process every token still buffered.
    pub async fn shutdown(self) {
        tracing::info!("Shutting down pipeline");

        self.cancel.cancel();
        if let Err(e) = self.scheduler.await {
            tracing::error!("Retry scheduler ended abnormally: {}", e);
        }

        self.producer.close();
        self.tracker.wait().await;

        tracing::info!("Pipeline stopped");
    }
}

/// Checks that a submitted URL is absolute http(s)
///
/// Returns the trimmed input unchanged; the stored URL is what the user sent.
pub fn validate_submission_url(url: &str) -> Result<String> {
    let trimmed = url.trim();
    let parsed = Url::parse(trimmed)?;

    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        scheme => Err(PipelineError::UnsupportedScheme {
            url: trimmed.to_string(),
            scheme: scheme.to_string(),
        }),
    }
}
