// Request handlers
//
// gateway.rs - `GET|POST /` event dispatch
// health.rs  - `GET /health` database and cache check
pub mod gateway;
pub mod health;

pub use gateway::{handle_event, Event};
pub use health::health;

use std::sync::Arc;

use crate::services::LocatorService;

/// State shared by every route
#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<LocatorService>,
    /// Upper bound for buffered request bodies
    pub max_request_size: usize,
}

impl AppState {
    pub fn new(locator: Arc<LocatorService>, max_request_size: usize) -> Self {
        Self { locator, max_request_size }
    }
}
