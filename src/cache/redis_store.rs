use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{CacheError, DataStore};
use crate::config::CacheConfig;

/// Redis-backed store; every entry is written with `EX <expire>`.
/// The connection is opened on first use and retried until it succeeds,
/// so an unreachable Redis only degrades lookups to the database.
pub struct RedisDataStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    expire: u64,
}

impl RedisDataStore {
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let url = format!("redis://{}:{}/", config.host, config.port);
        let client = redis::Client::open(url)?;

        info!("Using Redis data store at {}:{}", config.host, config.port);
        Ok(Self {
            client,
            connection: OnceCell::new(),
            expire: config.expire,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, CacheError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                self.client.get_connection_manager().await.map_err(|e| {
                    warn!("Redis connection failed: {}", e);
                    CacheError::from(e)
                })
            })
            .await?;
        Ok(connection.clone())
    }
}

#[async_trait]
impl DataStore for RedisDataStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut connection = self.connection().await?;
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut connection).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if self.expire > 0 {
            cmd.arg("EX").arg(self.expire);
        }
        cmd.query_async::<()>(&mut connection).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut connection = self.connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut connection).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(CacheError::Unavailable(format!("unexpected PING reply '{}'", reply)))
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
