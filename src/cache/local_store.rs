use async_trait::async_trait;
use moka::sync::Cache;
use std::time::Duration;
use tracing::info;

use super::{CacheError, DataStore};
use crate::config::CacheConfig;

/// In-process store for local runs and tests
pub struct LocalDataStore {
    entries: Cache<String, String>,
}

impl LocalDataStore {
    pub fn new(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if config.expire > 0 {
            builder = builder.time_to_live(Duration::from_secs(config.expire));
        }

        info!("Using in-memory data store");
        Self { entries: builder.build() }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[async_trait]
impl DataStore for LocalDataStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
