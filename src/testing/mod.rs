// The fixture lives with the integration tests so both suites seed the same rows
#[path = "../../tests/common/fixture.rs"]
mod fixture;

pub use fixture::{seeded_pool, Fixture};

use crate::database::DatabaseManager;

/// Seeded in-memory database for unit tests
pub async fn seeded_database() -> DatabaseManager {
    let pool = seeded_pool().await.expect("failed to seed in-memory sqlite");
    DatabaseManager::from_pool(pool)
}
