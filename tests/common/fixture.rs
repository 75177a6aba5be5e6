// Locator fixture shared by the unit tests (src/testing) and the integration tests
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

/// Schema and seed rows
pub const FIXTURE_SQL: &str = include_str!("../fixtures/locator.sql");

/// Identifiers seeded by `FIXTURE_SQL`
pub struct Fixture;

impl Fixture {
    pub const CORE_ID: i64 = 1;
    pub const RTV_ID: i64 = 4;
    pub const CAMPAIGN_GUID: &'static str = "6f0d2b1e-8c4a-4e3b-9f7d-1a2b3c4d5e6f";
    pub const BRANCH_GUID: &'static str = "23290b6d-693b-44c3-9dd1-f4fef0b5c9a3";
    pub const VACENTER_GUID: &'static str = "51a0f468-b179-403b-b8b9-338c8f332792";
    pub const USER_GUID: &'static str = "35c166d9-f30a-4dad-b5e4-27a4d205d392";
    pub const WRONG_GUID: &'static str = "18d37ab9-acb7-498a-9fc1-c258e8c82418";
    pub const IP: &'static str = "127.0.0.1";
    pub const WEB_PORT: i64 = 80;
    pub const SECURE_WEB_PORT: i64 = 443;
    pub const CORE_PORT: i64 = 9889;
    pub const WEBCONTROL_PORT: i64 = 9880;
}

/// Fresh in-memory SQLite pool seeded with `FIXTURE_SQL`.
/// A single long-lived connection keeps the in-memory data alive.
pub async fn seeded_pool() -> Result<AnyPool, sqlx::Error> {
    sqlx::any::install_default_drivers();

    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    for statement in FIXTURE_SQL.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement).execute(&pool).await?;
    }

    Ok(pool)
}
