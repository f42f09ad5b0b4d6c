//! Drink records and their public projections.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// One recipe entry, e.g. `{"name": "milk", "color": "grey", "parts": 1}`.
///
/// Kept as an open object: entries are stored exactly as submitted.
pub type Ingredient = Map<String, Value>;

/// Ordered list of ingredients.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    pub fn new(entries: Vec<Ingredient>) -> Self {
        Self(entries)
    }

    /// Parse the stored text form.
    pub fn from_text(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Serialize to the stored text form.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn entries(&self) -> &[Ingredient] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colour and proportion only; ingredient names are withheld.
    pub fn short(&self) -> Vec<ShortIngredient> {
        self.0
            .iter()
            .map(|entry| ShortIngredient {
                color: entry.get("color").cloned().unwrap_or(Value::Null),
                parts: entry.get("parts").cloned().unwrap_or(Value::Null),
            })
            .collect()
    }
}

/// Persisted drink.
#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Recipe,
}

impl Drink {
    pub fn new(id: i64, title: impl Into<String>, recipe: Recipe) -> Self {
        Self {
            id,
            title: title.into(),
            recipe,
        }
    }

    /// Public representation.
    pub fn short(&self) -> DrinkShort {
        DrinkShort {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.short(),
        }
    }

    /// Full representation, including ingredient names.
    pub fn long(&self) -> DrinkLong {
        DrinkLong {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.entries().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ShortIngredient {
    #[schema(value_type = Object, example = "blue")]
    pub color: Value,
    #[schema(value_type = Object, example = 1)]
    pub parts: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DrinkShort {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "water")]
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DrinkLong {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "water")]
    pub title: String,
    #[schema(value_type = Vec<Object>)]
    pub recipe: Vec<Ingredient>,
}

// ============================================================================
// Request body validation
// ============================================================================

/// Why a POST/PATCH body was rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DraftError {
    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing fields: {0:?}")]
    MissingFields(Vec<&'static str>),

    #[error("title must be a non-empty string")]
    InvalidTitle,

    #[error("recipe must be a list of ingredient objects")]
    InvalidRecipe,
}

/// Validated `{title, recipe}` body.
#[derive(Debug, Clone, PartialEq)]
pub struct DrinkDraft {
    pub title: String,
    pub recipe: Recipe,
}

impl DrinkDraft {
    pub const REQUIRED_FIELDS: [&'static str; 2] = ["title", "recipe"];

    /// Validate a parsed JSON body.
    ///
    /// A field that is absent or `null` counts as missing. Ingredient entries
    /// must be objects; their keys are not checked.
    pub fn from_json(body: &Value) -> Result<Self, DraftError> {
        let obj = body.as_object().ok_or(DraftError::NotAnObject)?;

        let missing: Vec<&'static str> = Self::REQUIRED_FIELDS
            .into_iter()
            .filter(|field| obj.get(*field).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(DraftError::MissingFields(missing));
        }

        let title = match obj.get("title") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(DraftError::InvalidTitle),
        };

        let recipe = match obj.get("recipe") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_object().cloned().ok_or(DraftError::InvalidRecipe))
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(DraftError::InvalidRecipe),
        };

        Ok(Self {
            title,
            recipe: Recipe::new(recipe),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn water() -> Drink {
        let recipe: Recipe =
            serde_json::from_value(json!([{"name": "Water", "color": "blue", "parts": 1}]))
                .unwrap();
        Drink::new(1, "Water", recipe)
    }

    #[test]
    fn test_short_omits_names() {
        let short = serde_json::to_value(water().short()).unwrap();
        assert_eq!(
            short,
            json!({"id": 1, "title": "Water", "recipe": [{"color": "blue", "parts": 1}]})
        );
    }

    #[test]
    fn test_long_is_full_recipe() {
        let long = serde_json::to_value(water().long()).unwrap();
        assert_eq!(
            long,
            json!({"id": 1, "title": "Water", "recipe": [{"name": "Water", "color": "blue", "parts": 1}]})
        );
    }

    #[test]
    fn test_short_fills_absent_keys_with_null() {
        let recipe: Recipe = serde_json::from_value(json!([{"name": "foam"}])).unwrap();
        let short = Drink::new(2, "Foam", recipe).short();
        assert_eq!(short.recipe[0].color, Value::Null);
        assert_eq!(short.recipe[0].parts, Value::Null);
    }

    #[test]
    fn test_recipe_text_form() {
        let recipe = water().recipe;
        let text = recipe.to_text().unwrap();
        assert_eq!(Recipe::from_text(&text).unwrap(), recipe);
        assert!(Recipe::from_text("{\"name\": 1}").is_err());
    }

    #[test]
    fn test_draft_valid() {
        let draft = DrinkDraft::from_json(&json!({
            "title": "Latte",
            "recipe": [{"name": "milk", "color": "grey", "parts": 3}, {"name": "coffee", "color": "brown", "parts": 1}]
        }))
        .unwrap();
        assert_eq!(draft.title, "Latte");
        assert_eq!(draft.recipe.len(), 2);
    }

    #[test]
    fn test_draft_missing_fields() {
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": "Water"})),
            Err(DraftError::MissingFields(vec!["recipe"]))
        );
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": null})),
            Err(DraftError::MissingFields(vec!["title", "recipe"]))
        );
    }

    #[test]
    fn test_draft_not_an_object() {
        assert_eq!(
            DrinkDraft::from_json(&json!([1, 2])),
            Err(DraftError::NotAnObject)
        );
    }

    #[test]
    fn test_draft_invalid_values() {
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": "", "recipe": []})),
            Err(DraftError::InvalidTitle)
        );
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": 5, "recipe": []})),
            Err(DraftError::InvalidTitle)
        );
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": "Tea", "recipe": "leaves"})),
            Err(DraftError::InvalidRecipe)
        );
        assert_eq!(
            DrinkDraft::from_json(&json!({"title": "Tea", "recipe": ["leaves"]})),
            Err(DraftError::InvalidRecipe)
        );
    }
}
