use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::config::Config;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open the process-wide pool. Fails fast: there is no retry, a store that
/// cannot be reached at startup stops the server.
pub async fn connect_pg(cfg: &Config) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .connect(&cfg.database_url)
        .await
        .context("unable to connect to database")?;

    tracing::info!(max_connections = cfg.max_connections, "connected to PostgreSQL");
    Ok(pool)
}

/// Apply pending versioned migrations. Never drops existing tables.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to apply database migrations")?;
    tracing::info!("database migrations complete");
    Ok(())
}

/// Release every pooled connection.
pub async fn shutdown(pool: PgPool) {
    pool.close().await;
    tracing::info!("database pool closed");
}
