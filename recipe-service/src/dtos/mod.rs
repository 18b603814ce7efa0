pub mod recipes;

pub use recipes::{RecipePayload, RecipeResponse, SearchParams};
