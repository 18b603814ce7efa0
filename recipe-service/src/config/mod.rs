use serde::Deserialize;
use service_core::config::{self as core_config, get_env, is_production};
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    /// Falls back to the database named in `uri` when unset.
    pub database: Option<String>,
    pub collection: String,
}

impl RecipeConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env, APP__ prefix and PORT)
        let common_config = core_config::Config::load()?;
        let is_prod = is_production();

        // `mongoURI` is accepted for deployments configured for the older service.
        let uri = match env::var("MONGODB_URI").or_else(|_| env::var("mongoURI")) {
            Ok(uri) => uri,
            Err(_) => get_env("MONGODB_URI", None, is_prod)?,
        };

        Ok(RecipeConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri,
                database: env::var("MONGODB_DATABASE")
                    .ok()
                    .filter(|name| !name.is_empty()),
                collection: get_env("MONGODB_COLLECTION", Some("recipes"), is_prod)?,
            },
        })
    }
}
