//! Ingredient normalization collaborator

use crate::enrich::{post_json, strip_code_fence, CollaboratorError};
use crate::recipe::{Ingredient, RecipeSet};
use async_trait::async_trait;
use indexmap::IndexMap;
use reqwest::Client;
use serde_json::{json, Value};

/// Free-text ingredient lists keyed by recipe key
pub type IngredientLists = IndexMap<String, Vec<String>>;

/// Normalized ingredient lists keyed by recipe key
pub type NormalizedLists = IndexMap<String, Vec<Ingredient>>;

#[async_trait]
pub trait IngredientNormalizer: Send + Sync {
    /// Returns normalized lists for some or all of the given keys
    async fn normalize(&self, lists: &IngredientLists) -> Result<NormalizedLists, CollaboratorError>;
}

/// Normalizer used when no service is configured; changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughNormalizer;

#[async_trait]
impl IngredientNormalizer for PassThroughNormalizer {
    async fn normalize(&self, _lists: &IngredientLists) -> Result<NormalizedLists, CollaboratorError> {
        Ok(NormalizedLists::new())
    }
}

/// Normalizer backed by an HTTP JSON service
///
/// Request: `{"ingredients": {"recipe_1": ["1 tsp salt", ...]}}`
/// Response: `{"recipe_1": [{"ingredient_name": "salt", "quantity": "1 tsp"}]}`
pub struct HttpNormalizer {
    client: Client,
    endpoint: String,
}

impl HttpNormalizer {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl IngredientNormalizer for HttpNormalizer {
    async fn normalize(&self, lists: &IngredientLists) -> Result<NormalizedLists, CollaboratorError> {
        let body = post_json(&self.client, &self.endpoint, &json!({ "ingredients": lists })).await?;
        parse_normalized(&body)
    }
}

/// Parses a normalizer response
///
/// A key with any entry lacking an `ingredient_name` is left out, so that
/// record keeps its original ingredients. A key whose value is not a list
/// makes the whole response invalid.
pub fn parse_normalized(body: &str) -> Result<NormalizedLists, CollaboratorError> {
    let raw: IndexMap<String, Vec<Value>> = serde_json::from_str(strip_code_fence(body))
        .map_err(|e| CollaboratorError::Decode(e.to_string()))?;

    Ok(raw
        .into_iter()
        .filter_map(|(key, entries)| {
            let ingredients: Option<Vec<Ingredient>> =
                entries.iter().map(Ingredient::from_json).collect();
            if ingredients.is_none() {
                tracing::debug!("Ignoring normalized list for {}: malformed entry", key);
            }
            ingredients.map(|ingredients| (key, ingredients))
        })
        .collect())
}

/// Runs the normalizer over every not-yet-normalized record
///
/// Returned lists replace the matching record's ingredients in place. Keys
/// the service does not return, or returns malformed or emptied, keep their
/// original ingredients; keys it invents are ignored. On any service failure
/// nothing changes.
///
/// # Returns
///
/// The number of records whose ingredients were replaced
pub async fn apply_normalization(
    recipes: &mut RecipeSet,
    normalizer: &dyn IngredientNormalizer,
) -> usize {
    let lists: IngredientLists = recipes
        .iter()
        .filter(|(_, record)| !record.is_normalized())
        .map(|(key, record)| (key.to_string(), record.ingredient_texts()))
        .collect();

    if lists.is_empty() {
        return 0;
    }

    let normalized = match normalizer.normalize(&lists).await {
        Ok(normalized) => normalized,
        Err(e) => {
            tracing::warn!("Ingredient normalization unavailable, keeping raw lists: {}", e);
            return 0;
        }
    };

    let mut replaced = 0;
    for (key, ingredients) in normalized {
        let Some(sent) = lists.get(&key) else {
            tracing::debug!("Ignoring normalized list for unknown key {}", key);
            continue;
        };
        if ingredients.is_empty() && !sent.is_empty() {
            tracing::debug!("Ignoring empty normalized list for {}", key);
            continue;
        }
        if let Some(record) = recipes.get_mut(&key) {
            record.replace_ingredients(ingredients);
            replaced += 1;
        }
    }

    tracing::info!("Normalized ingredients for {}/{} recipes", replaced, lists.len());
    replaced
}
