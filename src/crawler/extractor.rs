//! Structured-data extraction
//!
//! Pages embed several JSON-LD blocks (breadcrumbs, organization, the recipe
//! itself) and some of them are malformed. A bad block is skipped on its own;
//! scanning continues with the next one.

use crate::recipe::RecipeRecord;
use scraper::{Html, Selector};
use serde_json::Value;

/// Declared type of the record we look for
pub const TARGET_KIND: &str = "Recipe";

const JSON_LD_MIME: &str = "application/ld+json";

/// What one `<script type="application/ld+json">` block yielded
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
    /// The block had no content
    Empty,
    /// The block failed to decode; holds the decoder message
    Malformed(String),
    /// Candidate objects, flattened from a single object, a list, or a `@graph`
    Decoded(Vec<Value>),
}

/// Decodes every JSON-LD block of a document, in document order
pub fn scan_blocks(html: &str) -> Vec<BlockOutcome> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("script[type]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|element| {
            element
                .value()
                .attr("type")
                .is_some_and(is_json_ld_type)
        })
        .map(|element| decode_block(&element.text().collect::<String>()))
        .collect()
}

/// Returns the first `Recipe` object in document order, if any
///
/// # Example
///
/// ```
/// use recipe_consensus::crawler::extract_recipe;
///
/// let html = r#"<html><head>
///   <script type="application/ld+json">{"@type": "Recipe", "name": "Congee"}</script>
/// </head></html>"#;
/// let recipe = extract_recipe(html).unwrap();
/// assert_eq!(recipe.name.as_deref(), Some("Congee"));
/// ```
pub fn extract_recipe(html: &str) -> Option<RecipeRecord> {
    for (index, outcome) in scan_blocks(html).into_iter().enumerate() {
        match outcome {
            BlockOutcome::Empty => {}
            BlockOutcome::Malformed(reason) => {
                tracing::debug!("Skipping malformed JSON-LD block {}: {}", index, reason);
            }
            BlockOutcome::Decoded(candidates) => {
                if let Some(recipe) = candidates
                    .iter()
                    .find(|candidate| declares_type(candidate, TARGET_KIND))
                {
                    return RecipeRecord::from_json_ld(recipe);
                }
            }
        }
    }

    None
}

/// Returns true if the object's `@type` is `kind`, or a list containing it
pub fn declares_type(candidate: &Value, kind: &str) -> bool {
    match candidate.get("@type") {
        Some(Value::String(declared)) => declared == kind,
        Some(Value::Array(declared)) => declared.iter().any(|v| v.as_str() == Some(kind)),
        _ => false,
    }
}

/// Flattens the three JSON-LD top-level shapes into candidate objects
///
/// - a single object → itself
/// - an object with a `@graph` list → the graph members
/// - a list → each element, with `@graph` members expanded
pub fn candidate_objects(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.into_iter().flat_map(expand_graph).collect(),
        other => expand_graph(other),
    }
}

fn expand_graph(value: Value) -> Vec<Value> {
    match value {
        Value::Object(mut object) => match object.remove("@graph") {
            Some(Value::Array(members)) => members.into_iter().filter(Value::is_object).collect(),
            Some(graph) => {
                object.insert("@graph".to_string(), graph);
                vec![Value::Object(object)]
            }
            None => vec![Value::Object(object)],
        },
        _ => Vec::new(),
    }
}

fn decode_block(raw: &str) -> BlockOutcome {
    let raw = raw.trim();
    if raw.is_empty() {
        return BlockOutcome::Empty;
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => BlockOutcome::Decoded(candidate_objects(value)),
        Err(e) => BlockOutcome::Malformed(e.to_string()),
    }
}

fn is_json_ld_type(declared: &str) -> bool {
    declared
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(JSON_LD_MIME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(blocks: &[&str]) -> String {
        let scripts: String = blocks
            .iter()
            .map(|b| format!(r#"<script type="application/ld+json">{}</script>"#, b))
            .collect();
        format!(
            "<html><head><title>Test</title>{}</head><body><p>Hi</p></body></html>",
            scripts
        )
    }

    #[test]
    fn test_single_recipe_object() {
        let html = page(&[r#"{"@type": "Recipe", "name": "Dal", "recipeIngredient": ["lentils"]}"#]);
        let recipe = extract_recipe(&html).unwrap();
        assert_eq!(recipe.name.as_deref(), Some("Dal"));
        assert_eq!(recipe.recipe_ingredient.len(), 1);
    }

    #[test]
    fn test_list_of_objects() {
        let html = page(&[
            r#"[{"@type": "BreadcrumbList"}, {"@type": "Recipe", "name": "Pho"}]"#,
        ]);
        assert_eq!(extract_recipe(&html).unwrap().name.as_deref(), Some("Pho"));
    }

    #[test]
    fn test_graph_collection() {
        let html = page(&[r#"{
            "@context": "https://schema.org",
            "@graph": [
                {"@type": "Organization", "name": "Site"},
                {"@type": "WebPage", "name": "Page"},
                {"@type": "Recipe", "name": "Jollof"}
            ]
        }"#]);
        assert_eq!(
            extract_recipe(&html).unwrap().name.as_deref(),
            Some("Jollof")
        );
    }

    #[test]
    fn test_type_list_containing_recipe() {
        let html = page(&[r#"{"@type": ["Recipe", "NewsArticle"], "name": "Ramen"}"#]);
        assert_eq!(extract_recipe(&html).unwrap().name.as_deref(), Some("Ramen"));
    }

    #[test]
    fn test_malformed_block_does_not_stop_scan() {
        let html = page(&[
            r#"{"@type": "Organization", "name": "broken",,}"#,
            "",
            r#"{"@type": "Recipe", "name": "Later"}"#,
        ]);

        let outcomes = scan_blocks(&html);
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], BlockOutcome::Malformed(_)));
        assert_eq!(outcomes[1], BlockOutcome::Empty);
        assert_eq!(
            extract_recipe(&html).unwrap().name.as_deref(),
            Some("Later")
        );
    }

    #[test]
    fn test_first_match_in_document_order_wins() {
        let html = page(&[
            r#"{"@type": "Recipe", "name": "First"}"#,
            r#"{"@type": "Recipe", "name": "Second"}"#,
        ]);
        assert_eq!(extract_recipe(&html).unwrap().name.as_deref(), Some("First"));
    }

    #[test]
    fn test_off_type_blocks_yield_none() {
        let html = page(&[
            r#"{"@type": "BreadcrumbList"}"#,
            r#"{"@type": "Article", "recipeIngredient": ["salt"]}"#,
        ]);
        assert!(extract_recipe(&html).is_none());
    }

    #[test]
    fn test_page_without_blocks() {
        assert!(extract_recipe("<html><body>No data here</body></html>").is_none());
        assert!(scan_blocks("not even html").is_empty());
    }

    #[test]
    fn test_other_script_types_ignored() {
        let html = r#"<html><head>
            <script type="text/javascript">{"@type": "Recipe", "name": "Nope"}</script>
            <script type="Application/LD+JSON; charset=utf-8">{"@type": "Recipe", "name": "Yes"}</script>
        </head></html>"#;
        assert_eq!(extract_recipe(html).unwrap().name.as_deref(), Some("Yes"));
    }

    #[test]
    fn test_candidate_objects_shapes() {
        assert_eq!(candidate_objects(json!({"@type": "Recipe"})).len(), 1);
        assert_eq!(
            candidate_objects(json!([{"@type": "A"}, 42, {"@type": "B"}])).len(),
            2
        );
        assert_eq!(
            candidate_objects(json!({"@graph": [{"@type": "A"}, "x", {"@type": "B"}]})).len(),
            2
        );
        assert!(candidate_objects(json!("Recipe")).is_empty());
    }
}
