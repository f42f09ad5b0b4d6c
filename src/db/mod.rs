//! Database connection management

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// The drinks table. The store owns this schema; `title` uniqueness is
/// enforced here.
const CREATE_DRINKS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS drinks (
    id      SERIAL PRIMARY KEY,
    title   TEXT NOT NULL UNIQUE CHECK (length(title) > 0),
    recipe  TEXT NOT NULL
)"#;

/// PostgreSQL database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;

        tracing::info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Create the drinks table if it does not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(CREATE_DRINKS_TABLE).execute(&self.pool).await?;
        tracing::info!("Drinks schema ready");
        Ok(())
    }
}
