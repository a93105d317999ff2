//! Report types and the writer trait
//!
//! A `RecipeReport` is the complete answer to one aggregation request. Writers
//! render it to some destination (JSON on stdout, a Markdown file, ...).

use crate::output::stats::RunStatistics;
use crate::recipe::RecipeSet;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// The result of one aggregation request
#[derive(Debug, Clone, Serialize)]
pub struct RecipeReport {
    /// The search query, if the candidates came from search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Sort criterion forwarded to the sorter, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    pub generated_at: DateTime<Utc>,

    /// Annotated recipes keyed `recipe_1`, `recipe_2`, ...
    pub recipes: RecipeSet,

    pub statistics: RunStatistics,
}

impl RecipeReport {
    pub fn new(recipes: RecipeSet, statistics: RunStatistics) -> Self {
        Self {
            query: None,
            sort: None,
            generated_at: Utc::now(),
            recipes,
            statistics,
        }
    }

    /// Number of ingredient entries flagged as secret across all recipes
    pub fn secret_ingredient_count(&self) -> usize {
        self.recipes
            .iter()
            .flat_map(|(_, record)| record.structured_ingredients())
            .filter(|i| i.annotation.is_some_and(|a| a.is_secret_ingredient))
            .count()
    }
}

/// Trait for report writers
pub trait ReportWriter {
    /// Writes the complete report
    fn write_report(&mut self, report: &RecipeReport) -> OutputResult<()>;
}
