#![allow(dead_code, unused_imports)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

use orchestrator_gateway::{
    cache::LocalDataStore,
    config::CacheConfig,
    database::{DatabaseManager, SqlLocatorRepository},
    handlers::AppState,
    services::LocatorService,
};

mod fixture;

pub use fixture::Fixture;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
}

impl TestServer {
    /// Serve the gateway in-process over a seeded in-memory database.
    /// The server lives as long as the calling test's runtime.
    async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let database = seeded_database().await?;
        let locator = LocatorService::new(
            Arc::new(SqlLocatorRepository::new(database)),
            Arc::new(LocalDataStore::new(&CacheConfig::default())),
        );
        let state = AppState::new(Arc::new(locator), 1024 * 1024);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {}", base_url))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, orchestrator_gateway::app(state)).await {
                eprintln!("test server stopped: {}", e);
            }
        });

        Ok(Self { port, base_url })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

async fn seeded_database() -> Result<DatabaseManager> {
    let pool = fixture::seeded_pool().await.context("failed to seed in-memory sqlite")?;
    Ok(DatabaseManager::from_pool(pool))
}
