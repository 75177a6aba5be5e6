use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use super::AppState;

/// GET /health - report database and cache connectivity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let data_store = state.locator.data_store();

    let database = state.locator.health_check().await;
    let cache = data_store.ping().await;

    match (&database, &cache) {
        (Ok(()), Ok(())) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "cache": data_store.name()
                }
            })),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "backend unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": database.as_ref().err().map(|e| e.to_string()),
                    "cache_error": cache.as_ref().err().map(|e| e.to_string()),
                }
            })),
        ),
    }
}
