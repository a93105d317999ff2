//! External enrichment collaborators
//!
//! Two optional services post-process the recipe set:
//! - a normalizer that rewrites free-text ingredient lists into
//!   `{ingredient_name, quantity}` objects
//! - a sorter that returns a display order for the recipe keys
//!
//! Both sit behind traits. A failing or unreachable service never fails the
//! request: the `apply_*` functions fall back to the unmodified data.

mod normalize;
mod sort;

pub use normalize::{
    apply_normalization, parse_normalized, HttpNormalizer, IngredientLists, IngredientNormalizer,
    NormalizedLists, PassThroughNormalizer,
};
pub use sort::{apply_sort, parse_order, reorder, HttpSorter, PassThroughSorter, RecipeSorter};

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Generative services answer slowly; give them longer than a page fetch
pub const COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(60);

/// Errors raised by an enrichment collaborator
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Service returned HTTP {0}")]
    Status(u16),

    #[error("Unparseable response: {0}")]
    Decode(String),
}

/// Builds the HTTP client used for collaborator calls
pub fn build_service_client() -> Result<Client, reqwest::Error> {
    Client::builder().timeout(COLLABORATOR_TIMEOUT).build()
}

/// POSTs a JSON body and returns the raw response text
async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    endpoint: &str,
    body: &T,
) -> Result<String, CollaboratorError> {
    let response = client
        .post(endpoint)
        .json(body)
        .send()
        .await
        .map_err(|e| CollaboratorError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(CollaboratorError::Status(response.status().as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| CollaboratorError::Request(e.to_string()))
}

/// Strips a surrounding Markdown code fence, which generative services often
/// wrap JSON answers in
fn strip_code_fence(body: &str) -> &str {
    let trimmed = body.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // Drop the info string ("json") on the opening fence line
    match inner.split_once('\n') {
        Some((info, rest)) if !info.trim_start().starts_with(|c| c == '{' || c == '[') => rest.trim(),
        _ => inner.trim(),
    }
}
