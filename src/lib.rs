//! Recipe-Consensus: cross-recipe ingredient statistics
//!
//! This crate fetches a bounded set of recipe pages concurrently, extracts the
//! schema.org `Recipe` record embedded in each page, and annotates every
//! ingredient with how common it is across the accepted recipes.

pub mod config;
pub mod crawler;
pub mod enrich;
pub mod output;
pub mod pipeline;
pub mod recipe;
pub mod search;
pub mod url;

use thiserror::Error;

/// Main error type for Recipe-Consensus operations
#[derive(Debug, Error)]
pub enum ConsensusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search error: {0}")]
    Search(#[from] search::SearchError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ConsensusError {
    /// Returns the stable message shown to the user for a failed request
    ///
    /// Details stay in the log; the user only ever sees one of these strings.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Search(search::SearchError::MissingCredential(_)) => {
                "Recipe search is not configured: missing search API credentials"
            }
            Self::Config(_) => "Invalid configuration",
            Self::InvalidRequest(_) => "Invalid request",
            _ => "Failed to aggregate recipes",
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// Result type alias for Recipe-Consensus operations
pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{AggregationRequest, CandidateSource, Pipeline};
pub use recipe::{analyze, ConsensusLevel, Ingredient, RawIngredient, RecipeRecord, RecipeSet};
pub use url::{extract_domain, is_excluded, matches_wildcard};
