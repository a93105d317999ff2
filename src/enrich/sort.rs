//! Recipe ordering collaborator

use crate::enrich::{post_json, strip_code_fence, CollaboratorError};
use crate::recipe::RecipeSet;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;

#[async_trait]
pub trait RecipeSorter: Send + Sync {
    /// Returns recipe keys in the order the recipes should be presented
    async fn order(&self, recipes: &RecipeSet, criterion: &str)
        -> Result<Vec<String>, CollaboratorError>;
}

/// Sorter used when no service is configured; keeps rank order
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughSorter;

#[async_trait]
impl RecipeSorter for PassThroughSorter {
    async fn order(
        &self,
        recipes: &RecipeSet,
        _criterion: &str,
    ) -> Result<Vec<String>, CollaboratorError> {
        Ok(recipes.keys().map(str::to_string).collect())
    }
}

/// Sorter backed by an HTTP JSON service
///
/// Request: `{"criterion": "...", "recipes": {"recipe_1": {...}}}`
/// Response: `{"order": ["recipe_2", "recipe_1"]}` or a bare key array
pub struct HttpSorter {
    client: Client,
    endpoint: String,
}

impl HttpSorter {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl RecipeSorter for HttpSorter {
    async fn order(
        &self,
        recipes: &RecipeSet,
        criterion: &str,
    ) -> Result<Vec<String>, CollaboratorError> {
        let body = json!({ "criterion": criterion, "recipes": recipes });
        let response = post_json(&self.client, &self.endpoint, &body).await?;
        parse_order(&response)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderResponse {
    Wrapped { order: Vec<String> },
    Bare(Vec<String>),
}

/// Parses a sorter response into a key list
pub fn parse_order(body: &str) -> Result<Vec<String>, CollaboratorError> {
    match serde_json::from_str(strip_code_fence(body)) {
        Ok(OrderResponse::Wrapped { order }) | Ok(OrderResponse::Bare(order)) => Ok(order),
        Err(e) => Err(CollaboratorError::Decode(e.to_string())),
    }
}

/// Rebuilds the set in the given key order
///
/// Unknown and repeated keys are skipped. Keys the order leaves out are
/// appended in their original order. Keys themselves never change.
pub fn reorder(mut recipes: RecipeSet, order: &[String]) -> RecipeSet {
    let mut seen = HashSet::new();
    let mut sorted = RecipeSet::new();

    for key in order {
        if !seen.insert(key.as_str()) {
            continue;
        }
        if let Some(record) = recipes.remove(key) {
            sorted.insert(key.clone(), record);
        }
    }

    for (key, record) in recipes {
        sorted.insert(key, record);
    }

    sorted
}

/// Reorders the set by `criterion` using the sorter
///
/// On any sorter failure the set comes back in its original order.
pub async fn apply_sort(recipes: RecipeSet, sorter: &dyn RecipeSorter, criterion: &str) -> RecipeSet {
    if recipes.len() < 2 {
        return recipes;
    }

    match sorter.order(&recipes, criterion).await {
        Ok(order) => {
            tracing::info!("Sorted {} recipes by \"{}\"", recipes.len(), criterion);
            reorder(recipes, &order)
        }
        Err(e) => {
            tracing::warn!("Recipe sorting unavailable, keeping rank order: {}", e);
            recipes
        }
    }
}
