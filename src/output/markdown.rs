//! Markdown report generation
//!
//! Renders a human-readable summary: run statistics, then one ingredient table
//! per recipe with frequency, consensus tier, and secret-ingredient flags.

use crate::output::traits::{OutputResult, RecipeReport, ReportWriter};
use crate::recipe::{RawIngredient, RecipeRecord};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes the Markdown report to a file path
pub struct MarkdownReportWriter {
    path: PathBuf,
}

impl MarkdownReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportWriter for MarkdownReportWriter {
    fn write_report(&mut self, report: &RecipeReport) -> OutputResult<()> {
        generate_markdown_report(report, &self.path)
    }
}

/// Generates a Markdown report file
///
/// # Arguments
///
/// * `report` - The aggregation result
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_report(report: &RecipeReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_report(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a report as Markdown
pub fn format_markdown_report(report: &RecipeReport) -> String {
    let mut md = String::new();

    md.push_str("# Recipe Consensus Report\n\n");

    if let Some(query) = &report.query {
        md.push_str(&format!("- **Query**: {}\n", query));
    }
    if let Some(sort) = &report.sort {
        md.push_str(&format!("- **Sorted by**: {}\n", sort));
    }
    md.push_str(&format!(
        "- **Generated**: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("- **Recipes**: {}\n", report.recipes.len()));
    md.push_str(&format!(
        "- **Secret ingredients**: {}\n\n",
        report.secret_ingredient_count()
    ));

    let stats = &report.statistics;
    md.push_str("## Fetch Statistics\n\n");
    md.push_str("| Stage | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| Candidates | {} |\n", stats.candidates));
    md.push_str(&format!("| Excluded | {} |\n", stats.excluded));
    md.push_str(&format!("| Dispatched | {} |\n", stats.dispatched));
    md.push_str(&format!("| Fetch failures | {} |\n", stats.fetch_failures));
    md.push_str(&format!("| No recipe on page | {} |\n", stats.extraction_absent));
    md.push_str(&format!("| Extracted | {} |\n", stats.extracted));
    md.push_str(&format!("| Accepted | {} |\n", stats.accepted));
    md.push_str(&format!(
        "| Discarded over limit | {} |\n\n",
        stats.discarded_over_limit
    ));

    if report.recipes.is_empty() {
        md.push_str("_No recipes were found._\n");
        return md;
    }

    for (key, record) in report.recipes.iter() {
        format_recipe(&mut md, key, record);
    }

    md
}

fn format_recipe(md: &mut String, key: &str, record: &RecipeRecord) {
    md.push_str(&format!(
        "## {} ({})\n\n",
        record.name.as_deref().unwrap_or("Untitled recipe"),
        key
    ));

    match record.rating() {
        Some(rating) => md.push_str(&format!("- **Rating**: {:.1}\n", rating)),
        None => md.push_str("- **Rating**: n/a\n"),
    }
    for (label, value) in [
        ("Prep time", &record.prep_time),
        ("Cook time", &record.cook_time),
        ("Total time", &record.total_time),
    ] {
        if let Some(value) = value {
            md.push_str(&format!("- **{}**: {}\n", label, value));
        }
    }
    md.push('\n');

    if record.recipe_ingredient.is_empty() {
        md.push_str("_No ingredients listed._\n\n");
        return;
    }

    md.push_str("| Ingredient | Quantity | Frequency | Consensus | Secret |\n");
    md.push_str("|------------|----------|-----------|-----------|--------|\n");
    for entry in &record.recipe_ingredient {
        match entry {
            RawIngredient::Text(text) => {
                md.push_str(&format!("| {} | | | | |\n", escape_cell(text)));
            }
            RawIngredient::Structured(ingredient) => {
                let (frequency, consensus, secret) = match &ingredient.annotation {
                    Some(a) => (
                        format!("{}%", a.frequency_percent),
                        if a.consensus_level.is_normal() {
                            String::new()
                        } else {
                            a.consensus_level.label().to_string()
                        },
                        if a.is_secret_ingredient { "✨" } else { "" },
                    ),
                    None => (String::new(), String::new(), ""),
                };
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    escape_cell(&ingredient.ingredient_name),
                    escape_cell(ingredient.quantity.as_deref().unwrap_or("")),
                    frequency,
                    consensus,
                    secret
                ));
            }
        }
    }
    md.push('\n');
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
