use axum::{middleware, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, AppState};
use crate::middleware::request_data_middleware;

/// Build the gateway router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(gateway_routes(state.clone()))
        .route("/health", get(handlers::health))
        // Global middleware, outermost first
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn gateway_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::handle_event).post(handlers::handle_event))
        .route_layer(middleware::from_fn_with_state(state, request_data_middleware))
}
