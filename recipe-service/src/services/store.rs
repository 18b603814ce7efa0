use crate::models::{Recipe, RecipeChanges};
use async_trait::async_trait;
use service_core::error::AppError;

/// Persistence seam for recipes.
///
/// Lookups by id return `Ok(None)` when no record matches; an id the backend
/// cannot parse is an error.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Recipe>, AppError>;

    async fn get(&self, id: &str) -> Result<Option<Recipe>, AppError>;

    /// Persists `recipe` and returns it with its assigned id.
    async fn create(&self, recipe: Recipe) -> Result<Recipe, AppError>;

    /// Overwrites or clears the fields named in `changes` and returns the
    /// updated record.
    async fn update(&self, id: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError>;

    /// Removes the record and returns it as it was before removal.
    async fn delete(&self, id: &str) -> Result<Option<Recipe>, AppError>;

    /// Case-insensitive substring match on `name`. `text` is matched literally.
    async fn search_by_name(&self, text: &str) -> Result<Vec<Recipe>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    async fn shutdown(&self) {}
}
