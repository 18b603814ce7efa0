use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A stored recipe. Every field except the store-assigned id is optional and
/// absent fields are not written to the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Partial update of a recipe. An outer `None` leaves the field alone;
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeChanges {
    pub name: Option<Option<String>>,
    pub ingredients: Option<Option<Vec<String>>>,
    pub instructions: Option<Option<Vec<String>>>,
    pub time: Option<Option<f64>>,
    pub location: Option<Option<String>>,
}

impl RecipeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.time.is_none()
            && self.location.is_none()
    }
}

impl Recipe {
    /// Overwrites or clears the fields named in `changes`. The id is never touched.
    pub fn apply(&mut self, changes: RecipeChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(ingredients) = changes.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(instructions) = changes.instructions {
            self.instructions = instructions;
        }
        if let Some(time) = changes.time {
            self.time = time;
        }
        if let Some(location) = changes.location {
            self.location = location;
        }
    }
}
