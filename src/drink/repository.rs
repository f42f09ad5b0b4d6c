//! Drink persistence.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::error::StorageError;
use super::models::{Drink, Recipe};

/// Storage boundary for drinks. Each call is atomic for one record.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    /// All drinks, ordered by id.
    async fn list_all(&self) -> Result<Vec<Drink>, StorageError>;

    /// Insert a new drink; the store assigns the id.
    async fn insert(&self, title: &str, recipe: &Recipe) -> Result<Drink, StorageError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, StorageError>;

    /// Persist title and recipe of an existing drink.
    async fn update(&self, drink: &Drink) -> Result<(), StorageError>;

    async fn delete(&self, drink: &Drink) -> Result<(), StorageError>;
}

/// Postgres unique_violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed [`DrinkStore`] over the `drinks` table.
pub struct PgDrinkRepository {
    pool: PgPool,
}

impl PgDrinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_drink(row: &PgRow) -> Result<Drink, StorageError> {
        let id: i64 = row.try_get("id")?;
        let title: String = row.try_get("title")?;
        let text: String = row.try_get("recipe")?;
        let recipe = Recipe::from_text(&text).map_err(|e| StorageError::Corrupt {
            id,
            reason: e.to_string(),
        })?;
        Ok(Drink { id, title, recipe })
    }

    fn map_write_error(e: sqlx::Error, title: &str) -> StorageError {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                StorageError::DuplicateTitle(title.to_string())
            }
            _ => StorageError::Database(e),
        }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkRepository {
    async fn list_all(&self) -> Result<Vec<Drink>, StorageError> {
        let rows = sqlx::query(r#"SELECT id::BIGINT AS id, title, recipe FROM drinks ORDER BY id"#)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_drink).collect()
    }

    async fn insert(&self, title: &str, recipe: &Recipe) -> Result<Drink, StorageError> {
        let row = sqlx::query(
            r#"INSERT INTO drinks (title, recipe) VALUES ($1, $2)
               RETURNING id::BIGINT AS id, title, recipe"#,
        )
        .bind(title)
        .bind(recipe.to_text()?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, title))?;

        let drink = Self::row_to_drink(&row)?;
        tracing::info!("Inserted drink {} ({})", drink.id, drink.title);
        Ok(drink)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, StorageError> {
        let row =
            sqlx::query(r#"SELECT id::BIGINT AS id, title, recipe FROM drinks WHERE id = $1"#)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.as_ref().map(Self::row_to_drink).transpose()
    }

    async fn update(&self, drink: &Drink) -> Result<(), StorageError> {
        sqlx::query(r#"UPDATE drinks SET title = $2, recipe = $3 WHERE id = $1"#)
            .bind(drink.id)
            .bind(&drink.title)
            .bind(drink.recipe.to_text()?)
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(e, &drink.title))?;
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), StorageError> {
        sqlx::query(r#"DELETE FROM drinks WHERE id = $1"#)
            .bind(drink.id)
            .execute(&self.pool)
            .await?;
        tracing::info!("Deleted drink {} ({})", drink.id, drink.title);
        Ok(())
    }
}
