use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors raised while bootstrapping the connection pool
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the shared pool described by `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let raw = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
    let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout))
        .connect(url.as_str())
        .await?;

    info!(
        "Created database pool for {}{} (max {} connections)",
        url.host_str().unwrap_or("localhost"),
        url.path(),
        config.max_connections
    );
    Ok(pool)
}

/// Applies the embedded migrations under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

pub async fn close(pool: PgPool) {
    pool.close().await;
    info!("Closed database pool");
}
