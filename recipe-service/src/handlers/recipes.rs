use crate::dtos::{RecipePayload, RecipeResponse, SearchParams};
use crate::models::{Recipe, RecipeChanges};
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use service_core::error::AppError;

fn recipe_not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Recipe not found"))
}

fn into_responses(recipes: Vec<Recipe>) -> Json<Vec<RecipeResponse>> {
    Json(recipes.into_iter().map(RecipeResponse::from).collect())
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Reads the body as a payload. A body that is empty or not declared as JSON
/// is read as `{}`; malformed JSON is a generic fault.
fn payload(headers: &HeaderMap, body: &Bytes) -> Result<RecipePayload, AppError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecipePayload::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected recipe payload");
        AppError::BadRequest(anyhow::anyhow!("Invalid recipe payload: {}", e))
    })
}

/// `GET /api/recipes`
pub async fn list_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let recipes = state.store.list().await?;
    Ok(into_responses(recipes))
}

/// `GET /api/recipes/search?q=` — case-insensitive match on `name`.
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let text = params.q.unwrap_or_default();
    let recipes = state.store.search_by_name(&text).await?;

    tracing::debug!(query = %text, hits = recipes.len(), "Recipe search completed");

    Ok(into_responses(recipes))
}

/// `GET /api/recipes/:id`
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = state
        .store
        .get(&recipe_id)
        .await?
        .ok_or_else(recipe_not_found)?;

    Ok(Json(RecipeResponse::from(recipe)))
}

/// `POST /api/recipes`
pub async fn create_recipe(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = Recipe::from(payload(&headers, &body)?);
    let recipe = state.store.create(recipe).await?;

    if let Some(id) = recipe.id {
        tracing::info!(recipe_id = %id, "Recipe created");
    }

    Ok(Json(RecipeResponse::from(recipe)))
}

/// `PUT /api/recipes/:id` — overwrites the fields present in the body; `null` clears one.
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<RecipeResponse>, AppError> {
    let changes = RecipeChanges::from(payload(&headers, &body)?);
    let recipe = state
        .store
        .update(&recipe_id, changes)
        .await?
        .ok_or_else(recipe_not_found)?;

    tracing::info!(recipe_id = %recipe_id, "Recipe updated");

    Ok(Json(RecipeResponse::from(recipe)))
}

/// `DELETE /api/recipes/:id` — responds with the record as it was.
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let recipe = state
        .store
        .delete(&recipe_id)
        .await?
        .ok_or_else(recipe_not_found)?;

    tracing::info!(recipe_id = %recipe_id, "Recipe deleted");

    Ok(Json(RecipeResponse::from(recipe)))
}
