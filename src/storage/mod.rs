//! Storage module for persisting articles
//!
//! This module handles all database operations for the pipeline, including:
//! - SQLite database initialization and schema management
//! - Article creation at submission time
//! - Scrape outcome persistence (metadata on success, retry bookkeeping on failure)
//! - Retry-eligibility queries for the scheduler

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteArticleStore;
pub use traits::{ArticleStore, StorageError, StorageResult};

use crate::state::ScrapeStatus;
use std::path::Path;
use uuid::Uuid;

/// Initializes or opens an article database
pub fn open_storage(path: &Path) -> crate::Result<SqliteArticleStore> {
    Ok(SqliteArticleStore::new(path)?)
}

/// Represents an article in the database
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub url: String,
    pub status: ScrapeStatus,
    pub retry_count: u32,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub last_error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A failed article that is still under the retry ceiling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedScrape {
    pub id: Uuid,
    pub url: String,
    pub retry_count: u32,
}

/// Article counts per scrape status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: u64,
    pub success: u64,
    pub failed: u64,
}

impl StatusCounts {
    pub fn total(&self) -> u64 {
        self.pending + self.success + self.failed
    }

    /// Adds `count` to the bucket for `status`
    pub fn add(&mut self, status: ScrapeStatus, count: u64) {
        match status {
            ScrapeStatus::Pending => self.pending += count,
            ScrapeStatus::Success => self.success += count,
            ScrapeStatus::Failed => self.failed += count,
        }
    }
}
