use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// Shared alias so repos don't spell out the concrete pool type everywhere.
pub type Db = sqlx::PgPool;

/// Open the connection pool with the sizing used across environments: a
/// short acquire timeout so a saturated pool fails requests instead of
/// queueing them, and bounded idle/total lifetimes so connections recycle.
pub async fn connect(url: &str, max_connections: u32) -> sqlx::Result<Db> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .idle_timeout(Some(Duration::from_secs(600)))
        .max_lifetime(Some(Duration::from_secs(1800)))
        .connect(url)
        .await
}
