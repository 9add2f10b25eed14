//! Database connection management

use atrium_core::{ServiceError, ServiceResult};
use atrium_migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::{debug, info};

pub type DbConnection = DatabaseConnection;

/// Connect to `database_url` and bring the schema up to date.
pub async fn establish_connection(database_url: &str) -> ServiceResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(database_url);
    let (max, min) = pool_size(database_url);
    opt.max_connections(max).min_connections(min).sqlx_logging(false);

    debug!("Connecting to database (pool {}..{})", min, max);
    let db = Database::connect(opt)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;

    Migrator::up(&db, None)
        .await
        .map_err(|e| ServiceError::Database(e.to_string()))?;
    info!("Database migrations applied");

    Ok(Arc::new(db))
}

/// Every connection to `sqlite::memory:` opens its own database, so that pool is pinned
/// to a single connection.
fn pool_size(database_url: &str) -> (u32, u32) {
    if database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory") {
        (1, 1)
    } else if database_url.starts_with("sqlite:") {
        (5, 1)
    } else {
        (100, 5)
    }
}
