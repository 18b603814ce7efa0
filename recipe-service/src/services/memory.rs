use crate::models::{Recipe, RecipeChanges};
use crate::services::RecipeStore;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::RegexBuilder;
use service_core::error::AppError;
use std::sync::{Mutex, MutexGuard};

/// Process-local store with the same semantics as the MongoDB store. Records
/// are kept in insertion order.
#[derive(Default)]
pub struct InMemoryRecipeStore {
    recipes: Mutex<Vec<Recipe>>,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<Recipe>>, AppError> {
        self.recipes
            .lock()
            .map_err(|_| AppError::InternalError(anyhow::anyhow!("Recipe store lock poisoned")))
    }
}

fn parse_id(id: &str) -> Result<ObjectId, AppError> {
    Ok(ObjectId::parse_str(id)?)
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>, AppError> {
        Ok(self.lock()?.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        let oid = parse_id(id)?;
        Ok(self.lock()?.iter().find(|r| r.id == Some(oid)).cloned())
    }

    async fn create(&self, mut recipe: Recipe) -> Result<Recipe, AppError> {
        recipe.id = Some(ObjectId::new());
        self.lock()?.push(recipe.clone());
        Ok(recipe)
    }

    async fn update(&self, id: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let oid = parse_id(id)?;
        let mut recipes = self.lock()?;

        Ok(recipes
            .iter_mut()
            .find(|r| r.id == Some(oid))
            .map(|recipe| {
                recipe.apply(changes);
                recipe.clone()
            }))
    }

    async fn delete(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        let oid = parse_id(id)?;
        let mut recipes = self.lock()?;

        let index = recipes.iter().position(|r| r.id == Some(oid));
        Ok(index.map(|index| recipes.remove(index)))
    }

    async fn search_by_name(&self, text: &str) -> Result<Vec<Recipe>, AppError> {
        let pattern = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

        Ok(self
            .lock()?
            .iter()
            .filter(|r| r.name.as_deref().is_some_and(|name| pattern.is_match(name)))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.lock().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Recipe {
        Recipe {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_distinct_ids() {
        let store = InMemoryRecipeStore::new();
        let a = store.create(named("Tomato Soup")).await.unwrap();
        let b = store.create(named("Tomato Soup")).await.unwrap();

        assert!(a.id.is_some());
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_returns_snapshot_once() {
        let store = InMemoryRecipeStore::new();
        let created = store.create(named("Beef Stew")).await.unwrap();
        let id = created.id.unwrap().to_hex();

        assert_eq!(store.delete(&id).await.unwrap(), Some(created));
        assert_eq!(store.delete(&id).await.unwrap(), None);
        assert_eq!(store.get(&id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_merges_present_fields() {
        let store = InMemoryRecipeStore::new();
        let created = store.create(named("Beef Stew")).await.unwrap();
        let id = created.id.unwrap().to_hex();

        let updated = store
            .update(
                &id,
                RecipeChanges {
                    time: Some(Some(30.0)),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name.as_deref(), Some("Beef Stew"));
        assert_eq!(updated.time, Some(30.0));
        assert_eq!(store.get(&id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_with_cleared_field_removes_it() {
        let store = InMemoryRecipeStore::new();
        let created = store
            .create(Recipe {
                name: Some("Beef Stew".to_string()),
                location: Some("Dublin".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        let id = created.id.unwrap().to_hex();

        let changes = RecipeChanges {
            location: Some(None),
            ..Default::default()
        };
        let updated = store.update(&id, changes).await.unwrap().unwrap();

        assert!(updated.location.is_none());
        assert_eq!(updated.name.as_deref(), Some("Beef Stew"));
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let store = InMemoryRecipeStore::new();
        let missing = ObjectId::new().to_hex();
        let changes = RecipeChanges {
            name: Some(Some("x".to_string())),
            ..Default::default()
        };
        assert_eq!(store.update(&missing, changes).await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_ids_are_errors() {
        let store = InMemoryRecipeStore::new();
        assert!(store.get("abc").await.is_err());
        assert!(store.update("abc", RecipeChanges::default()).await.is_err());
        assert!(store.delete("abc").await.is_err());
    }

    #[tokio::test]
    async fn search_matches_name_substrings_ignoring_case() {
        let store = InMemoryRecipeStore::new();
        store.create(named("Tomato Soup")).await.unwrap();
        store.create(named("Beef Stew")).await.unwrap();
        store
            .create(Recipe {
                location: Some("Tomato farm".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let hits = store.search_by_name("TOMATO").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name.as_deref(), Some("Tomato Soup"));

        assert_eq!(store.search_by_name("soup").await.unwrap().len(), 1);
        assert!(store.search_by_name("xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_metacharacters_literally() {
        let store = InMemoryRecipeStore::new();
        store.create(named("Beef Stew")).await.unwrap();
        store.create(named("Pie (3.14)")).await.unwrap();

        assert!(store.search_by_name(".*").await.unwrap().is_empty());
        let hits = store.search_by_name("(3.14)").await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
