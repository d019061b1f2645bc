//! Data-store access: a process-wide lazily constructed pool plus one
//! repository per table.

pub mod order_repository;
pub mod service_request_repository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use tracing::info;

use crate::config;
use crate::errors::AppError;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Returns the shared connection pool, constructing it on first use from
/// `DATABASE_URL` and running pending migrations. A construction failure is
/// propagated to the caller; the pool is never rebuilt within a process
/// lifetime.
pub async fn pool() -> Result<&'static PgPool, AppError> {
    POOL.get_or_try_init(|| async {
        let database_url = config::require_env("DATABASE_URL")?;
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(&database_url)
            .await
            .map_err(AppError::DatabaseConnectionFailed)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(AppError::MigrationFailed)?;
        info!("database connection established and migrations applied");
        Ok(pool)
    })
    .await
}
