use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::{AppError, AppResult};

/// Most queued writes sent to Redis in one pipeline
const MAX_WRITE_BATCH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// TMDB details for one movie id
    MovieDetails(u64),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::MovieDetails(id) => write!(f, "details:{}", id),
        }
    }
}

/// Creates a Redis client for caching
///
/// Opening a client does not connect; the cache connects on first use.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// One serialized value waiting to be written
struct PendingWrite {
    key: CacheKey,
    json: String,
    ttl: u64,
}

/// Read-through store for provider responses, backed by Redis
///
/// Reads go straight to Redis. Writes are queued and applied by a background
/// task so that caching never delays a response.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

/// Background writer state: the queue and a connection reused across batches
struct CacheWriter {
    client: Client,
    conn: Option<MultiplexedConnection>,
    write_rx: mpsc::UnboundedReceiver<PendingWrite>,
}

impl CacheWriter {
    async fn run(mut self, mut shutdown_rx: mpsc::Receiver<()>) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                received = self.write_rx.recv() => {
                    let Some(first) = received else { break };
                    let batch = self.collect_batch(first);
                    self.write_batch(batch).await;
                }
                _ = shutdown_rx.recv() => {
                    self.write_rx.close();
                    let mut flushed = 0;
                    while let Some(first) = self.write_rx.recv().await {
                        let batch = self.collect_batch(first);
                        flushed += batch.len();
                        self.write_batch(batch).await;
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    return;
                }
            }
        }

        tracing::info!("Cache writer channel closed");
    }

    /// `first` plus whatever else is already queued, up to `MAX_WRITE_BATCH`
    fn collect_batch(&mut self, first: PendingWrite) -> Vec<PendingWrite> {
        let mut batch = vec![first];
        while batch.len() < MAX_WRITE_BATCH {
            match self.write_rx.try_recv() {
                Ok(write) => batch.push(write),
                Err(_) => break,
            }
        }
        batch
    }

    async fn write_batch(&mut self, batch: Vec<PendingWrite>) {
        let count = batch.len();
        if let Err(e) = self.try_write_batch(batch).await {
            tracing::error!(error = %e, count, "Failed to write batch to Redis cache");
        }
    }

    /// A failed batch drops the connection so the next one reconnects
    async fn try_write_batch(&mut self, batch: Vec<PendingWrite>) -> AppResult<()> {
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.client.get_multiplexed_async_connection().await?,
        };

        let mut pipe = redis::pipe();
        for write in batch {
            pipe.set_ex(write.key.to_string(), write.json, write.ttl).ignore();
        }
        let _: () = pipe.query_async(&mut conn).await?;

        self.conn = Some(conn);
        Ok(())
    }
}

impl Cache {
    /// Creates a new Cache instance with a background write task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let writer = CacheWriter {
            client: redis_client.clone(),
            conn: None,
            write_rx,
        };
        tokio::spawn(writer.run(shutdown_rx));

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    /// Retrieves and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Corrupt cache entry {}: {}", key, e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.clone(),
            json,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer stopped, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cached;

    // Nothing listens on port 1, so every connection attempt fails fast.
    fn unreachable_cache() -> (Cache, CacheWriterHandle) {
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        Cache::new(client)
    }

    #[test]
    fn test_cache_key_display_movie_details() {
        let key = CacheKey::MovieDetails(27205);
        assert_eq!(format!("{}", key), "details:27205");
    }

    #[test]
    fn test_collect_batch_is_bounded() {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let mut writer = CacheWriter {
            client: create_redis_client("redis://127.0.0.1:1").unwrap(),
            conn: None,
            write_rx,
        };
        for id in 0..100 {
            write_tx
                .send(PendingWrite {
                    key: CacheKey::MovieDetails(id),
                    json: "{}".to_string(),
                    ttl: 60,
                })
                .unwrap();
        }

        let first = writer.write_rx.try_recv().unwrap();
        let batch = writer.collect_batch(first);
        assert_eq!(batch.len(), MAX_WRITE_BATCH);
        assert_eq!(batch[0].key, CacheKey::MovieDetails(0));

        let first = writer.write_rx.try_recv().unwrap();
        assert_eq!(writer.collect_batch(first).len(), 100 - MAX_WRITE_BATCH);
    }

    #[test]
    fn test_create_redis_client_rejects_bad_url() {
        assert!(create_redis_client("not a url").is_err());
    }

    #[tokio::test]
    async fn test_get_from_unreachable_cache_errors() {
        let (cache, _handle) = unreachable_cache();
        let result: AppResult<Option<String>> =
            cache.get_from_cache(&CacheKey::MovieDetails(1)).await;
        assert!(result.is_err());
    }

    async fn lookup(cache: Option<Cache>, calls: &mut u32) -> AppResult<String> {
        cached!(cache, CacheKey::MovieDetails(42), 60, async {
            *calls += 1;
            Ok::<_, AppError>("computed".to_string())
        })
    }

    #[tokio::test]
    async fn test_cached_without_cache_computes() {
        let mut calls = 0;
        assert_eq!(lookup(None, &mut calls).await.unwrap(), "computed");
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_cached_treats_read_failure_as_miss() {
        let (cache, handle) = unreachable_cache();
        let mut calls = 0;

        assert_eq!(lookup(Some(cache), &mut calls).await.unwrap(), "computed");
        assert_eq!(calls, 1);

        handle.shutdown().await;
    }

    async fn failing_lookup() -> AppResult<String> {
        cached!(None::<Cache>, CacheKey::MovieDetails(7), 60, async {
            Err::<String, _>(AppError::ExternalApi("boom".to_string()))
        })
    }

    #[tokio::test]
    async fn test_cached_propagates_block_error() {
        let result = failing_lookup().await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }
}
