use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file {0} was not found")]
    FileNotFound(String),

    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub environment: Environment,
    pub http: HttpConfig,
    pub log: LogConfig,
    pub cache: CacheConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    Development,
    Production,
    IntegrationTest,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub host: String,
    pub port: u16,
    /// Seconds an entry stays cached
    pub expire: u64,
    /// Capacity of the in-memory backend
    pub max_entries: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Full connection URL; when absent one is built from the MySQL fields below
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout_secs: u64,
    pub connection_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_request_size_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string() }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            host: "127.0.0.1".to_string(),
            port: 6379,
            expire: 60,
            max_entries: 10_000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: "configuration".to_string(),
            max_connections: 5,
            min_connections: 0,
            idle_timeout_secs: 10,
            connection_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration in order of increasing precedence:
    /// environment preset (or config file when given), then environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::from_environment_name(env::var("APP_ENV").ok().as_deref()),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// The integration_test preset has no database of its own; it must be
    /// pointed at a seeded SQLite file (`SQLFILE`) or an explicit URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == Environment::IntegrationTest && self.database.url.is_none() {
            return Err(ConfigError::Invalid(
                "integration_test requires SQLFILE or DATABASE_URL".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_environment_name(name: Option<&str>) -> Self {
        match name {
            Some("production") | Some("prod") => Self::production(),
            Some("integration_test") | Some("test") => Self::integration_test(),
            _ => Self::development(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply nconf-style overrides (`SECTION__KEY`) from the given lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // HTTP overrides
        if let Some(v) = lookup("HTTP_PORT") {
            self.http.port = v.parse().unwrap_or(self.http.port);
        }
        if let Some(v) = lookup("HTTP__MAX_REQUEST_SIZE_BYTES") {
            self.http.max_request_size_bytes = v.parse().unwrap_or(self.http.max_request_size_bytes);
        }

        // Log overrides
        if let Some(v) = lookup("LOGLEVEL") {
            self.log.level = v;
        }

        // Cache overrides
        if let Some(v) = lookup("CACHE__BACKEND") {
            match v.to_ascii_lowercase().as_str() {
                "redis" => self.cache.backend = CacheBackend::Redis,
                "memory" | "local" => self.cache.backend = CacheBackend::Memory,
                other => tracing::warn!("Ignoring unknown cache backend '{}'", other),
            }
        }
        if let Some(v) = lookup("REDIS__HOST") {
            self.cache.host = v;
        }
        if let Some(v) = lookup("REDIS__PORT") {
            self.cache.port = v.parse().unwrap_or(self.cache.port);
        }
        if let Some(v) = lookup("REDIS__EXPIRE") {
            self.cache.expire = v.parse().unwrap_or(self.cache.expire);
        }

        // Database overrides; an explicit DATABASE_URL wins over SQLFILE
        if let Some(v) = lookup("SQLFILE") {
            self.database.url = Some(format!("sqlite://{}", v));
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Some(v) = lookup("MYSQL__HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("MYSQL__PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Some(v) = lookup("MYSQL__USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("MYSQL__PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("MYSQL__DATABASE") {
            self.database.database = v;
        }
        if let Some(v) = lookup("MYSQL__MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }

        self
    }

    /// Copy of the configuration that is safe to log
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.database.password.is_empty() {
            copy.database.password = "********".to_string();
        }
        if let Some(url) = copy.database.url.as_deref() {
            if let Ok(mut parsed) = url::Url::parse(url) {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("********"));
                    copy.database.url = Some(parsed.to_string());
                }
            }
        }
        copy
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            http: HttpConfig::default(),
            log: LogConfig { level: "debug".to_string() },
            cache: CacheConfig::default(),
            database: DatabaseConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            http: HttpConfig::default(),
            log: LogConfig { level: "info".to_string() },
            cache: CacheConfig {
                expire: 300,
                ..CacheConfig::default()
            },
            database: DatabaseConfig::default(),
        }
    }

    fn integration_test() -> Self {
        Self {
            environment: Environment::IntegrationTest,
            http: HttpConfig::default(),
            log: LogConfig { level: "warn".to_string() },
            cache: CacheConfig {
                backend: CacheBackend::Memory,
                ..CacheConfig::default()
            },
            database: DatabaseConfig {
                max_connections: 1,
                ..DatabaseConfig::default()
            },
        }
    }
}
