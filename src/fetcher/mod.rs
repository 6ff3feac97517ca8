//! Fetcher module for scraping link-preview metadata
//!
//! This module contains:
//! - The `Fetcher` capability used by scrape workers
//! - An HTTP implementation built on reqwest
//! - Open Graph / HTML metadata extraction

mod client;
mod metadata;

pub use client::{build_http_client, HttpFetcher};
pub use metadata::{extract_metadata, PageMetadata};

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

/// Errors produced by a single page fetch
///
/// All variants are treated as transient by the worker pool: the article is
/// marked failed and left for the retry scheduler.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Fetches a URL and extracts its preview metadata
///
/// Implementations must give up once `deadline` passes and report
/// `FetchError::Timeout`.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, deadline: Instant) -> Result<PageMetadata, FetchError>;
}
