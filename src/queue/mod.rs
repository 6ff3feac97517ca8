//! Task queue carrying article identifiers from producers to scrape workers
//!
//! The queue is split into two capabilities so the transport can change
//! without touching the worker pool or the retry scheduler:
//! - `Producer`: non-blocking enqueue that fails fast when the buffer is full
//! - `Consumer`: waits for the next token; ends once the queue is closed and drained
//!
//! Tokens are opaque strings. There is no priority and no deduplication; the
//! same identifier may be queued more than once.

mod channel;

pub use channel::{ChannelConsumer, ChannelProducer, ChannelQueue};

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned when enqueueing a token
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full")]
    Full,

    #[error("queue is closed")]
    Closed,
}

/// Enqueue side of the task queue
pub trait Producer: Send + Sync {
    /// Attempts to enqueue `token` without waiting
    ///
    /// Returns `QueueError::Full` immediately if the buffer is saturated.
    fn produce(&self, token: &str) -> Result<(), QueueError>;

    /// Stops accepting tokens
    ///
    /// Tokens already buffered are still delivered to consumers.
    fn close(&self);
}

/// Dequeue side of the task queue
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Waits for the next token
    ///
    /// Returns `None` only when the queue is closed and every buffered token
    /// has been handed out.
    async fn next(&self) -> Option<String>;
}
