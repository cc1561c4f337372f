use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Connect to Postgres with a pool sized for the storefront's traffic mix:
/// short catalog reads plus the occasional row-locking settlement
/// transaction. The acquire timeout stays well under the payment gateway's
/// webhook retry interval, so a saturated pool surfaces as a retryable
/// error instead of a hung delivery.
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    const MAX_CONNECTIONS: u32 = 20;

    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .connect(database_url)
        .await?;

    tracing::info!("Connected to Postgres (pool: {} max connections)", MAX_CONNECTIONS);

    Ok(pool)
}
