use thiserror::Error;

/// Drink repository failures.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("a drink titled '{0}' already exists")]
    DuplicateTitle(String),

    #[error("drink {id} has an unreadable recipe: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("Recipe encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}
