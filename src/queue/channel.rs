//! In-memory queue backed by a bounded tokio mpsc channel

use crate::queue::{Consumer, Producer, QueueError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, error::TrySendError};

/// Constructor for the in-memory channel queue
pub struct ChannelQueue;

impl ChannelQueue {
    /// Creates a queue holding at most `capacity` tokens
    ///
    /// A capacity of zero is raised to one; mpsc channels cannot be unbuffered.
    pub fn bounded(capacity: usize) -> (ChannelProducer, ChannelConsumer) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let producer = ChannelProducer {
            sender: Arc::new(Mutex::new(Some(sender))),
        };
        let consumer = ChannelConsumer {
            receiver: Arc::new(tokio::sync::Mutex::new(receiver)),
        };

        (producer, consumer)
    }
}

/// Producer half; clones share one sender so `close` affects all of them
#[derive(Debug, Clone)]
pub struct ChannelProducer {
    sender: Arc<Mutex<Option<mpsc::Sender<String>>>>,
}

impl Producer for ChannelProducer {
    fn produce(&self, token: &str) -> Result<(), QueueError> {
        let guard = self.sender.lock().unwrap_or_else(|p| p.into_inner());
        let sender = guard.as_ref().ok_or(QueueError::Closed)?;

        sender
            .try_send(token.to_string())
            .map_err(|error| match error {
                TrySendError::Full(_) => QueueError::Full,
                TrySendError::Closed(_) => QueueError::Closed,
            })
    }

    fn close(&self) {
        // Dropping the only sender closes the channel once it drains
        self.sender
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
    }
}

/// Consumer half; clones share the receiver so several workers can pull from it
#[derive(Debug, Clone)]
pub struct ChannelConsumer {
    receiver: Arc<tokio::sync::Mutex<mpsc::Receiver<String>>>,
}

#[async_trait]
impl Consumer for ChannelConsumer {
    async fn next(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }
}
