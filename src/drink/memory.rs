//! In-process [`DrinkStore`], used when no PostgreSQL URL is configured.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::error::StorageError;
use super::models::{Drink, Recipe};
use super::repository::DrinkStore;

#[derive(Default)]
struct Inner {
    drinks: BTreeMap<i64, Drink>,
    next_id: i64,
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.drinks
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }
}

/// Drinks held in memory; ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryDrinkStore {
    inner: RwLock<Inner>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, StorageError> {
        Ok(self.inner.read().await.drinks.values().cloned().collect())
    }

    async fn insert(&self, title: &str, recipe: &Recipe) -> Result<Drink, StorageError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(title, None) {
            return Err(StorageError::DuplicateTitle(title.to_string()));
        }
        inner.next_id += 1;
        let drink = Drink::new(inner.next_id, title, recipe.clone());
        inner.drinks.insert(drink.id, drink.clone());
        Ok(drink)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Drink>, StorageError> {
        Ok(self.inner.read().await.drinks.get(&id).cloned())
    }

    async fn update(&self, drink: &Drink) -> Result<(), StorageError> {
        let mut inner = self.inner.write().await;
        if inner.title_taken(&drink.title, Some(drink.id)) {
            return Err(StorageError::DuplicateTitle(drink.title.clone()));
        }
        // Like an UPDATE ... WHERE id = $1, a vanished row is a no-op.
        if let Some(stored) = inner.drinks.get_mut(&drink.id) {
            *stored = drink.clone();
        }
        Ok(())
    }

    async fn delete(&self, drink: &Drink) -> Result<(), StorageError> {
        self.inner.write().await.drinks.remove(&drink.id);
        Ok(())
    }
}
