//! Storage traits and error types
//!
//! This module defines the trait interface for article storage backends and
//! associated error types.

use crate::fetcher::PageMetadata;
use crate::storage::{ArticleRecord, FailedScrape, StatusCounts};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Article not found: {0}")]
    ArticleNotFound(Uuid),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for article storage backends
///
/// Workers, the retry scheduler and the submission path share one store, so
/// implementations must be safe to call from many tasks at once. Every method
/// is a single atomic unit; callers never group them into a transaction.
pub trait ArticleStore: Send + Sync {
    /// Stores a new article in the `pending` state with a zero retry count
    fn create_article(&self, url: &str) -> StorageResult<ArticleRecord>;

    /// Gets an article by ID
    ///
    /// Returns `StorageError::ArticleNotFound` if no such article exists.
    fn find_by_id(&self, id: Uuid) -> StorageResult<ArticleRecord>;

    /// Stores scraped metadata and marks the article `success`
    ///
    /// Clears the last recorded failure cause. The retry count is left as is.
    fn update_metadata(&self, id: Uuid, metadata: &PageMetadata) -> StorageResult<()>;

    /// Marks the article `failed` and increments its retry count
    fn mark_scrape_failed(&self, id: Uuid, cause: &str) -> StorageResult<()>;

    /// Gets every failed article whose retry count is below `max_retries`
    fn find_failed_scrapes(&self, max_retries: u32) -> StorageResult<Vec<FailedScrape>>;

    /// Deletes an article
    fn delete_article(&self, id: Uuid) -> StorageResult<()>;

    /// Lists the most recently submitted articles, newest first
    fn list_articles(&self, limit: usize) -> StorageResult<Vec<ArticleRecord>>;

    /// Counts articles per scrape status
    fn count_by_status(&self) -> StorageResult<StatusCounts>;
}
