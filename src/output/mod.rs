//! Output module for aggregation reports
//!
//! This module handles:
//! - The `RecipeReport` returned for every request
//! - Run statistics for the fan-out
//! - JSON and Markdown report writers

mod json;
mod markdown;
pub mod stats;
mod traits;

pub use json::JsonReportWriter;
pub use markdown::{format_markdown_report, generate_markdown_report, MarkdownReportWriter};
pub use stats::{format_statistics, log_statistics, RunStatistics};
pub use traits::{OutputError, OutputResult, RecipeReport, ReportWriter};
