//! Generation job queue.
//!
//! Intake pushes request ids; the generation worker pops them. Redis is used
//! when configured, otherwise jobs stay in-process.

pub mod redis_queue;

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

pub use redis_queue::RedisJobQueue;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Malformed job payload '{0}'")]
    Malformed(String),
}

#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, request_id: Uuid) -> Result<(), QueueError>;

    /// Waits up to `wait` for the next job; `None` when nothing arrived.
    async fn next(&self, wait: Duration) -> Result<Option<Uuid>, QueueError>;

    fn backend(&self) -> &'static str;
}

/// FIFO queue living in this process. Jobs are lost on restart; the startup
/// recovery sweep re-enqueues anything still pending.
#[derive(Default)]
pub struct MemoryJobQueue {
    jobs: Mutex<VecDeque<Uuid>>,
    notify: Notify,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn enqueue(&self, request_id: Uuid) -> Result<(), QueueError> {
        self.jobs.lock().await.push_back(request_id);
        self.notify.notify_one();
        Ok(())
    }

    async fn next(&self, wait: Duration) -> Result<Option<Uuid>, QueueError> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let popped = self.jobs.lock().await.pop_front();
            if popped.is_some() {
                return Ok(popped);
            }
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return Ok(None);
            }
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_queue_is_fifo() {
        let queue = MemoryJobQueue::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        queue.enqueue(a).await.unwrap();
        queue.enqueue(b).await.unwrap();

        assert_eq!(queue.next(Duration::from_millis(10)).await.unwrap(), Some(a));
        assert_eq!(queue.next(Duration::from_millis(10)).await.unwrap(), Some(b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_queue_times_out_when_empty() {
        let queue = MemoryJobQueue::new();
        assert_eq!(queue.next(Duration::from_secs(5)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_waiting_consumer_wakes_on_enqueue() {
        let queue = std::sync::Arc::new(MemoryJobQueue::new());
        let id = Uuid::new_v4();

        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.next(Duration::from_secs(5)).await })
        };
        tokio::task::yield_now().await;
        queue.enqueue(id).await.unwrap();

        assert_eq!(consumer.await.unwrap().unwrap(), Some(id));
    }
}
