use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager and the locator repository
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }
}

/// Owns the connection pool for the configuration database
#[derive(Clone)]
pub struct DatabaseManager {
    pool: AnyPool,
}

impl DatabaseManager {
    /// Build a lazily-connecting pool; the first query opens the connection
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        sqlx::any::install_default_drivers();

        let connection_string = Self::build_connection_string(config)?;
        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .connect_lazy(&connection_string)?;

        info!("Created database pool for: {}", config.database);
        Ok(Self { pool })
    }

    /// Wrap an already-built pool
    pub fn from_pool(pool: AnyPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Use the configured URL as-is, otherwise assemble a MySQL URL
    fn build_connection_string(config: &DatabaseConfig) -> Result<String, DatabaseError> {
        if let Some(url) = config.url.as_deref() {
            return Ok(url.to_string());
        }
        if config.host.is_empty() {
            return Err(DatabaseError::ConfigMissing("MYSQL__HOST"));
        }

        let mut url = url::Url::parse("mysql://localhost").map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_host(Some(&config.host)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        url.set_port(Some(config.port)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !config.user.is_empty() {
            url.set_username(&config.user).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        if !config.password.is_empty() {
            url.set_password(Some(&config.password)).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        }
        url.set_path(&format!("/{}", config.database));
        Ok(url.into())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}
