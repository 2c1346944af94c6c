pub(crate) mod models;
pub(crate) mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::core::config::Settings;

/// A run issues its queries one after another, so a handful of connections
/// is plenty even with the outbox notifier sharing the pool.
pub(crate) async fn init_pool(settings: &Settings) -> Result<PgPool> {
    let database = settings.database();
    let connect_options = database
        .database_url()
        .parse::<PgConnectOptions>()
        .context("Invalid database URL")?
        .application_name("suspended-group-sweep")
        .log_statements(tracing::log::LevelFilter::Off);

    let pool = PgPoolOptions::new()
        .max_connections(database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await
        .context("Failed to connect to the platform database")?;

    tracing::info!(max_connections = database.max_connections, "Database pool ready");
    Ok(pool)
}

pub(crate) async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await.context("Failed to apply migrations")?;
    tracing::info!("Platform schema migrations applied");
    Ok(())
}
