use crate::config::MongoConfig;
use crate::models::{Recipe, RecipeChanges};
use crate::services::RecipeStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Bson, Document},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

const DEFAULT_DATABASE: &str = "recipes";

#[derive(Clone)]
pub struct MongoRecipeStore {
    client: MongoClient,
    db: Database,
    collection: String,
}

impl MongoRecipeStore {
    pub async fn connect(config: &MongoConfig) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(&config.uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;

        let db = match config.database.as_deref() {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        };
        tracing::info!(database = %db.name(), "Successfully connected to MongoDB database");

        Ok(Self {
            client,
            db,
            collection: config.collection.clone(),
        })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for recipe-service");

        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(
                IndexOptions::builder()
                    .name("recipe_name_idx".to_string())
                    .build(),
            )
            .build();

        self.recipes()
            .create_index(name_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create name index on recipes collection: {}", e);
                AppError::from(e)
            })?;
        tracing::info!(collection = %self.collection, "Created index on recipes.name");

        Ok(())
    }

    pub fn recipes(&self) -> Collection<Recipe> {
        self.db.collection(&self.collection)
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    async fn find_all(&self, filter: Document) -> Result<Vec<Recipe>, AppError> {
        let cursor = self.recipes().find(filter, None).await.map_err(|e| {
            tracing::error!("Failed to query recipes: {}", e);
            AppError::from(e)
        })?;

        cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect recipes: {}", e);
            AppError::from(e)
        })
    }
}

fn id_filter(id: &str) -> Result<Document, AppError> {
    let oid = ObjectId::parse_str(id).map_err(|e| {
        tracing::warn!(id = %id, "Malformed recipe id: {}", e);
        AppError::from(e)
    })?;
    Ok(doc! { "_id": oid })
}

/// Stages one field of a partial update: a value goes to `$set`, a cleared
/// field to `$unset`.
fn stage<T>(set: &mut Document, unset: &mut Document, key: &str, change: Option<Option<T>>)
where
    T: Into<Bson>,
{
    match change {
        Some(Some(value)) => {
            set.insert(key, value);
        }
        Some(None) => {
            unset.insert(key, "");
        }
        None => {}
    }
}

/// `$set`/`$unset` update document for `changes`. Empty operators are left out.
pub fn update_document(changes: RecipeChanges) -> Document {
    let mut set = Document::new();
    let mut unset = Document::new();

    stage(&mut set, &mut unset, "name", changes.name);
    stage(&mut set, &mut unset, "ingredients", changes.ingredients);
    stage(&mut set, &mut unset, "instructions", changes.instructions);
    stage(&mut set, &mut unset, "time", changes.time);
    stage(&mut set, &mut unset, "location", changes.location);

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !unset.is_empty() {
        update.insert("$unset", unset);
    }
    update
}

/// `$regex` filter matching `text` literally anywhere in `name`, ignoring case.
pub fn name_search_filter(text: &str) -> Document {
    doc! {
        "name": {
            "$regex": regex::escape(text),
            "$options": "i",
        }
    }
}

#[async_trait]
impl RecipeStore for MongoRecipeStore {
    async fn list(&self) -> Result<Vec<Recipe>, AppError> {
        self.find_all(doc! {}).await
    }

    async fn get(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        self.recipes()
            .find_one(id_filter(id)?, None)
            .await
            .map_err(|e| {
                tracing::error!(id = %id, "Failed to find recipe: {}", e);
                AppError::from(e)
            })
    }

    async fn create(&self, mut recipe: Recipe) -> Result<Recipe, AppError> {
        let result = self
            .recipes()
            .insert_one(&recipe, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert recipe: {}", e);
                AppError::from(e)
            })?;

        let id = result.inserted_id.as_object_id().ok_or_else(|| {
            AppError::DatabaseError(anyhow::anyhow!(
                "Inserted recipe id is not an ObjectId: {}",
                result.inserted_id
            ))
        })?;
        recipe.id = Some(id);

        Ok(recipe)
    }

    async fn update(&self, id: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let filter = id_filter(id)?;

        // The server rejects an empty update document, so a no-op update is a read.
        if changes.is_empty() {
            return self.get(id).await;
        }

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.recipes()
            .find_one_and_update(filter, update_document(changes), options)
            .await
            .map_err(|e| {
                tracing::error!(id = %id, "Failed to update recipe: {}", e);
                AppError::from(e)
            })
    }

    async fn delete(&self, id: &str) -> Result<Option<Recipe>, AppError> {
        self.recipes()
            .find_one_and_delete(id_filter(id)?, None)
            .await
            .map_err(|e| {
                tracing::error!(id = %id, "Failed to delete recipe: {}", e);
                AppError::from(e)
            })
    }

    async fn search_by_name(&self, text: &str) -> Result<Vec<Recipe>, AppError> {
        self.find_all(name_search_filter(text)).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}
