use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheKey, DataStore};
use crate::database::models::{CoreModule, LocatorKind, PairCoreRtv, RtvModule, VaCenterList};
use crate::database::{DatabaseError, LocatorRepository};

/// A locator joined with the core modules and RTV server it resolves to
#[derive(Debug, Clone, PartialEq)]
pub struct CoreResolution {
    pub pair: PairCoreRtv,
    pub cores: Vec<CoreModule>,
    pub rtv: RtvModule,
}

/// Cache-aside lookups over the locator repository
pub struct LocatorService {
    repository: Arc<dyn LocatorRepository>,
    data_store: Arc<dyn DataStore>,
}

impl LocatorService {
    pub fn new(repository: Arc<dyn LocatorRepository>, data_store: Arc<dyn DataStore>) -> Self {
        Self { repository, data_store }
    }

    pub fn data_store(&self) -> &Arc<dyn DataStore> {
        &self.data_store
    }

    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        self.repository.health_check().await
    }

    /// Return the cached value for `key`, otherwise fetch it and cache the result.
    /// Failed fetches are not cached; cache failures fall through to `fetch`.
    async fn cached<T, F, Fut>(&self, key: CacheKey<'_>, fetch: F) -> Result<T, DatabaseError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, DatabaseError>>,
    {
        let key = key.to_string();

        match self.data_store.get(&key).await {
            Ok(Some(raw)) if !raw.is_empty() => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    debug!("{} served from cache", key);
                    return Ok(value);
                }
                Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
            },
            Ok(_) => debug!("{} not found in cache retrieving from DB", key),
            Err(e) => warn!("Cache read failed for {}, retrieving from DB: {}", key, e),
        }

        let value = fetch().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => {
                if let Err(e) = self.data_store.set(&key, &raw).await {
                    warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => warn!("Failed to encode {} for cache: {}", key, e),
        }

        Ok(value)
    }

    pub async fn core_by_id(&self, id: Option<i64>) -> Result<Vec<CoreModule>, DatabaseError> {
        self.cached(CacheKey::CoreById(id), || self.repository.core_by_id(id)).await
    }

    pub async fn rtv_by_id(&self, id: Option<i64>) -> Result<Vec<RtvModule>, DatabaseError> {
        self.cached(CacheKey::RtvById(id), || self.repository.rtv_by_id(id)).await
    }

    pub async fn vacenters_by_user(&self, guid: &str) -> Result<VaCenterList, DatabaseError> {
        self.cached(CacheKey::VaCentersByUser(guid), || self.repository.vacenters_by_user(guid))
            .await
    }

    pub async fn core_by_locator(&self, kind: LocatorKind, guid: &str) -> Result<PairCoreRtv, DatabaseError> {
        self.cached(CacheKey::CoreByLocator(kind, guid), || {
            self.repository.pair_by_locator(kind, guid)
        })
        .await
    }

    pub async fn core_by_campaign(&self, guid: &str) -> Result<PairCoreRtv, DatabaseError> {
        self.core_by_locator(LocatorKind::Campaign, guid).await
    }

    pub async fn core_by_branch(&self, guid: &str) -> Result<PairCoreRtv, DatabaseError> {
        self.core_by_locator(LocatorKind::Branch, guid).await
    }

    pub async fn core_by_vacenter(&self, guid: &str) -> Result<PairCoreRtv, DatabaseError> {
        self.core_by_locator(LocatorKind::VaCenter, guid).await
    }

    /// Resolve the locator, then fetch its core modules and RTV concurrently
    pub async fn resolve_core(&self, kind: LocatorKind, guid: &str) -> Result<CoreResolution, DatabaseError> {
        let pair = self.core_by_locator(kind, guid).await?;

        let (cores, rtvs) = tokio::try_join!(
            self.core_by_id(Some(pair.core_id)),
            self.rtv_by_id(Some(pair.rtv_id)),
        )?;

        if cores.is_empty() {
            return Err(DatabaseError::NotFound(format!("core {}", pair.core_id)));
        }
        let rtv = rtvs
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::NotFound(format!("RTV {}", pair.rtv_id)))?;

        Ok(CoreResolution { pair, cores, rtv })
    }
}
