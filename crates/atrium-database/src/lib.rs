//! Database connection and test utilities

pub use sea_orm;
mod connection;

pub use connection::{establish_connection, DbConnection};

// Export test utilities for use by other crates in their tests
pub mod test_utils;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    #[tokio::test]
    async fn test_establish_connection_runs_migrations() -> anyhow::Result<()> {
        let db = establish_connection("sqlite::memory:").await?;

        let row = db
            .query_one(Statement::from_string(
                DatabaseBackend::Sqlite,
                "SELECT COUNT(*) AS total FROM users".to_owned(),
            ))
            .await?;

        let total: i64 = row
            .ok_or_else(|| anyhow::anyhow!("no row returned"))?
            .try_get("", "total")?;
        assert_eq!(total, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_establish_connection_rejects_bad_url() {
        let result = establish_connection("notadb://nowhere").await;
        assert!(matches!(result, Err(atrium_core::ServiceError::Database(_))));
    }
}
