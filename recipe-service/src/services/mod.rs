pub mod database;
pub mod memory;
pub mod store;

pub use database::MongoRecipeStore;
pub use memory::InMemoryRecipeStore;
pub use store::RecipeStore;
