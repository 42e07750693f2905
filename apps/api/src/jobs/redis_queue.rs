use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{JobQueue, QueueError};

pub const GENERATION_QUEUE_KEY: &str = "songstory:generation_jobs";

/// Redis list used as a FIFO: `LPUSH` on enqueue, `BRPOP` on consume.
///
/// Connections are opened on first use and kept. Producers share one
/// multiplexed connection; the consumer gets its own, since `BRPOP` holds
/// the connection for the whole wait. A connection that errors is dropped
/// and reopened on the next call.
pub struct RedisJobQueue {
    client: redis::Client,
    key: String,
    producer: Mutex<Option<MultiplexedConnection>>,
    consumer: Mutex<Option<MultiplexedConnection>>,
}

impl RedisJobQueue {
    pub fn new(client: redis::Client) -> Self {
        Self {
            client,
            key: GENERATION_QUEUE_KEY.to_string(),
            producer: Mutex::new(None),
            consumer: Mutex::new(None),
        }
    }

    async fn connection(
        &self,
        slot: &Mutex<Option<MultiplexedConnection>>,
    ) -> Result<MultiplexedConnection, QueueError> {
        let mut slot = slot.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn drop_connection(&self, slot: &Mutex<Option<MultiplexedConnection>>) {
        slot.lock().await.take();
    }

    #[cfg(test)]
    async fn has_open_connections(&self) -> bool {
        self.producer.lock().await.is_some() || self.consumer.lock().await.is_some()
    }
}

fn parse_job(payload: &str) -> Result<Uuid, QueueError> {
    Uuid::parse_str(payload.trim()).map_err(|_| QueueError::Malformed(payload.to_string()))
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, request_id: Uuid) -> Result<(), QueueError> {
        let mut conn = self.connection(&self.producer).await?;
        let pushed: redis::RedisResult<()> = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(request_id.to_string())
            .query_async(&mut conn)
            .await;
        if let Err(e) = pushed {
            warn!("LPUSH failed, reconnecting on next enqueue: {e}");
            self.drop_connection(&self.producer).await;
            return Err(e.into());
        }
        debug!("Enqueued generation job {request_id} on {}", self.key);
        Ok(())
    }

    async fn next(&self, wait: Duration) -> Result<Option<Uuid>, QueueError> {
        let mut conn = self.connection(&self.consumer).await?;
        let popped: redis::RedisResult<Option<(String, String)>> = redis::cmd("BRPOP")
            .arg(&self.key)
            .arg(wait.as_secs().max(1))
            .query_async(&mut conn)
            .await;
        let popped = match popped {
            Ok(popped) => popped,
            Err(e) => {
                self.drop_connection(&self.consumer).await;
                return Err(e.into());
            }
        };

        popped.map(|(_, payload)| parse_job(&payload)).transpose()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job_accepts_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_job(&format!(" {id}\n")).unwrap(), id);
    }

    #[test]
    fn test_parse_job_rejects_garbage() {
        assert!(matches!(parse_job("not-a-uuid"), Err(QueueError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_no_connection_is_opened_until_first_use() {
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let queue = RedisJobQueue::new(client);
        assert!(!queue.has_open_connections().await);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        // Nothing listens on port 1.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let queue = RedisJobQueue::new(client);

        let err = queue.enqueue(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, QueueError::Redis(_)));
        let err = queue.next(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, QueueError::Redis(_)));

        assert!(!queue.has_open_connections().await);
    }
}
