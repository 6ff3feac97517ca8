//! Preview Pipeline: background link-preview scraping
//!
//! This crate ingests submitted article URLs, fetches each page, extracts
//! preview metadata (title, description, image) and persists it, retrying
//! failed fetches on a fixed schedule up to a retry ceiling.

pub mod config;
pub mod fetcher;
pub mod pipeline;
pub mod queue;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Queue error: {0}")]
    Queue(#[from] queue::QueueError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Unsupported URL scheme '{scheme}' in {url}")]
    UnsupportedScheme { url: String, scheme: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetcher::{Fetcher, HttpFetcher, PageMetadata};
pub use pipeline::Pipeline;
pub use queue::{ChannelQueue, Consumer, Producer};
pub use state::ScrapeStatus;
pub use storage::{ArticleStore, SqliteArticleStore};
