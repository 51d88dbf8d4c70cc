//! Database module
//!
//! Database connection and schema utilities.

use sqlx::{Executor, PgPool};

/// Initial schema, idempotent (`CREATE ... IF NOT EXISTS`)
const INIT_SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Tables the application needs before it can serve requests
const REQUIRED_TABLES: &[&str] = &["account_documents", "sessions"];

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the bundled schema
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // A plain &str runs through the simple query protocol, which accepts
    // several statements at once.
    pool.execute(INIT_SCHEMA).await?;
    tracing::info!("Database schema applied");
    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
