//! Background scrape pipeline
//!
//! This module contains the concurrent part of the system:
//! - Scrape workers consuming article identifiers from the task queue
//! - The retry scheduler re-queueing failed articles
//! - The coordinator that starts, feeds and stops both

mod coordinator;
mod retry;
mod worker;

pub use coordinator::{validate_submission_url, Pipeline};
pub use retry::{RequeueReport, RetryScheduler};
pub use worker::{run_worker, CycleOutcome, ScrapeWorker, WorkerPool};
