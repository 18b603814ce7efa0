use crate::models::{Recipe, RecipeChanges};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Client-supplied body for create and update. Unknown fields are ignored.
///
/// Each field is `None` when the key is absent and `Some(None)` when it is
/// `null`. Scalars are cast to the field's type the way a document mapper
/// would: `5` becomes `"5"`, `"salt"` becomes `["salt"]`, `true` becomes `1`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub ingredients: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub instructions: Option<Option<Vec<String>>>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub time: Option<Option<f64>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<Option<String>>,
}

impl From<RecipePayload> for Recipe {
    fn from(payload: RecipePayload) -> Self {
        Recipe {
            id: None,
            name: payload.name.flatten(),
            ingredients: payload.ingredients.flatten(),
            instructions: payload.instructions.flatten(),
            time: payload.time.flatten(),
            location: payload.location.flatten(),
        }
    }
}

impl From<RecipePayload> for RecipeChanges {
    fn from(payload: RecipePayload) -> Self {
        RecipeChanges {
            name: payload.name,
            ingredients: payload.ingredients,
            instructions: payload.instructions,
            time: payload.time,
            location: payload.location,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> String {
        match self {
            Scalar::Bool(value) => value.to_string(),
            Scalar::Number(value) => value.to_string(),
            Scalar::Text(value) => value,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(
        Option::<Scalar>::deserialize(deserializer)?.map(Scalar::into_text),
    ))
}

/// A lone scalar is wrapped into a one-element list.
fn lenient_text_list<'de, D>(deserializer: D) -> Result<Option<Option<Vec<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Scalar>),
        One(Scalar),
    }

    let list = Option::<OneOrMany>::deserialize(deserializer)?.map(|value| match value {
        OneOrMany::Many(items) => items.into_iter().map(Scalar::into_text).collect(),
        OneOrMany::One(item) => vec![item.into_text()],
    });
    Ok(Some(list))
}

/// Accepts `30`, `30.5`, `"30"` and booleans (`1`/`0`). A blank string clears
/// the value like `null` does.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Scalar>::deserialize(deserializer)? {
        None => None,
        Some(Scalar::Bool(value)) => Some(if value { 1.0 } else { 0.0 }),
        Some(Scalar::Number(value)) => Some(value.as_f64().ok_or_else(|| {
            de::Error::custom(format!("time is out of range: {}", value))
        })?),
        Some(Scalar::Text(text)) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                match text.parse::<f64>() {
                    Ok(value) if value.is_finite() => Some(value),
                    _ => {
                        return Err(de::Error::custom(format!(
                            "time must be a number, got {:?}",
                            text
                        )))
                    }
                }
            }
        }
    };
    Ok(Some(value))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "whole_numbers_as_integers"
    )]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: recipe.name,
            ingredients: recipe.ingredients,
            instructions: recipe.instructions,
            time: recipe.time,
            location: recipe.location,
        }
    }
}

// 2^53: beyond this an f64 no longer holds every integer exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn whole_numbers_as_integers<S>(time: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match time {
        Some(value) if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER => {
            serializer.serialize_i64(*value as i64)
        }
        Some(value) => serializer.serialize_f64(*value),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}
