use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use orchestrator_gateway::{
    app,
    cache,
    config::AppConfig,
    database::{DatabaseManager, SqlLocatorRepository},
    handlers::AppState,
    services::LocatorService,
};

#[derive(Parser)]
#[command(name = "orchestrator-gateway")]
#[command(about = "Resolve campaign, branch and VA-center locators to core/RTV servers")]
#[command(version)]
struct Args {
    /// JSON or YAML configuration file replacing the environment preset
    #[arg(long, env = "CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Log level or tracing filter directive
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up MYSQL__*, REDIS__*, etc.
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config_file.as_deref()).context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(level) = args.log_level {
        config.log.level = level;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting orchestrator gateway in {:?} mode", config.environment);
    tracing::info!(
        "Configuration: {}",
        serde_json::to_string_pretty(&config.redacted()).unwrap_or_default()
    );

    let database = DatabaseManager::connect(&config.database).context("failed to configure database pool")?;
    let data_store = cache::connect(&config.cache).await.context("failed to connect data store")?;
    let repository = SqlLocatorRepository::new(database.clone());
    let locator = LocatorService::new(Arc::new(repository), data_store);

    let state = AppState::new(Arc::new(locator), config.http.max_request_size_bytes);

    let bind_addr = format!("0.0.0.0:{}", config.http.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Orchestrator gateway listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    database.close().await;
    tracing::info!("Orchestrator gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
