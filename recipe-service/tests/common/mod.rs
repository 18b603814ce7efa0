#![allow(dead_code)]

use recipe_service::config::{MongoConfig, RecipeConfig};
use recipe_service::services::{InMemoryRecipeStore, MongoRecipeStore, RecipeStore};
use recipe_service::startup::Application;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub mongo: Option<(MongoRecipeStore, String)>,
}

impl TestApp {
    /// Spawns the service on a random port over an in-memory store.
    pub async fn spawn() -> Self {
        let app = Application::with_store(0, Arc::new(InMemoryRecipeStore::new()))
            .await
            .expect("Failed to build test application");

        Self::start(app, None).await
    }

    /// Spawns the service against a throwaway MongoDB database.
    pub async fn spawn_with_mongo() -> Self {
        let db_name = format!("recipe_test_{}", Uuid::new_v4().simple());
        let config = RecipeConfig {
            common: CoreConfig { port: 0 },
            mongodb: MongoConfig {
                uri: std::env::var("TEST_MONGODB_URI")
                    .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                database: Some(db_name.clone()),
                collection: "recipes".to_string(),
            },
        };

        let store = MongoRecipeStore::connect(&config.mongodb)
            .await
            .expect("Failed to connect to MongoDB");
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        Self::start(app, Some((store, db_name))).await
    }

    async fn start(app: Application, mongo: Option<(MongoRecipeStore, String)>) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            mongo,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_recipe(&self, body: &Value) -> Value {
        let response = self
            .client
            .post(self.url("/api/recipes"))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Failed to parse response")
    }

    /// Drops the throwaway database, if any.
    pub async fn cleanup(&self) {
        if let Some((store, db_name)) = &self.mongo {
            let _ = store.client().database(db_name).drop(None).await;
            store.shutdown().await;
        }
    }
}
