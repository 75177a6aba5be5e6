pub mod key;
pub mod local_store;
pub mod redis_store;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{CacheBackend, CacheConfig};

pub use key::CacheKey;
pub use local_store::LocalDataStore;
pub use redis_store::RedisDataStore;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

/// Key-value store holding JSON-encoded lookup results with a fixed expiry
#[async_trait]
pub trait DataStore: Send + Sync {
    /// `None` when the key is absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    async fn ping(&self) -> Result<(), CacheError>;

    fn name(&self) -> &'static str;
}

/// Build the data store selected by configuration
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn DataStore>, CacheError> {
    let store: Arc<dyn DataStore> = match config.backend {
        CacheBackend::Redis => Arc::new(RedisDataStore::connect(config).await?),
        CacheBackend::Memory => Arc::new(LocalDataStore::new(config)),
    };
    Ok(store)
}
