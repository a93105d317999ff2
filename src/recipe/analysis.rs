//! Ingredient consensus analysis
//!
//! Counts, for every ingredient name, how many distinct recipes list it, then
//! annotates each ingredient entry with its frequency, consensus tier, and
//! whether it is the distinguishing ("secret") ingredient of a highly rated
//! recipe.
//!
//! Records whose ingredients have not been normalized into
//! `{ingredient_name, quantity}` objects are left out of the counts and left
//! unannotated, but they still count towards the total number of recipes.

use crate::recipe::record::{ConsensusLevel, IngredientAnnotation, RecipeRecord, RecipeSet};
use std::collections::{HashMap, HashSet};

/// Frequency (percent) at or above which an ingredient is `Essential`
pub const ESSENTIAL_THRESHOLD: u8 = 60;

/// Frequency (percent) below which an ingredient is a `FlavorVariant`
pub const FLAVOR_VARIANT_THRESHOLD: u8 = 40;

/// Minimum coerced rating for a recipe to count as highly rated
pub const HIGH_RATING_THRESHOLD: f64 = 4.5;

impl ConsensusLevel {
    /// Classifies a frequency percentage
    pub fn from_frequency(frequency_percent: u8) -> Self {
        if frequency_percent >= ESSENTIAL_THRESHOLD {
            Self::Essential
        } else if frequency_percent < FLAVOR_VARIANT_THRESHOLD {
            Self::FlavorVariant
        } else {
            Self::Normal
        }
    }
}

/// Returns true if the record's rating coerces to a float ≥ 4.5
pub fn is_highly_rated(record: &RecipeRecord) -> bool {
    record
        .rating()
        .is_some_and(|rating| rating >= HIGH_RATING_THRESHOLD)
}

/// `round(100 * count / total)`, rounding halves to even
pub fn frequency_percent(count: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let percent = (100.0 * count as f64 / total as f64).round_ties_even();
    percent.clamp(0.0, 100.0) as u8
}

/// Counts the distinct normalized recipes each ingredient name appears in
///
/// A name listed twice in one recipe counts once.
pub fn ingredient_counts(recipes: &RecipeSet) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for (_, record) in recipes.iter().filter(|(_, r)| r.is_normalized()) {
        let names: HashSet<&str> = record
            .structured_ingredients()
            .map(|i| i.ingredient_name.as_str())
            .collect();

        for name in names {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }

    counts
}

/// Annotates every ingredient of every normalized record in place
///
/// With fewer than two recipes there is nothing to compare against and the
/// set is left untouched.
///
/// # Example
///
/// ```
/// use recipe_consensus::recipe::{analyze, RecipeRecord, RecipeSet};
/// use serde_json::json;
///
/// let mut recipes = RecipeSet::new();
/// for names in [vec!["salt", "pepper"], vec!["salt"]] {
///     let ingredients: Vec<_> = names
///         .iter()
///         .map(|n| json!({"ingredient_name": n, "quantity": "1 tsp"}))
///         .collect();
///     let value = json!({"@type": "Recipe", "recipeIngredient": ingredients});
///     recipes.push(RecipeRecord::from_json_ld(&value).unwrap());
/// }
///
/// analyze(&mut recipes);
///
/// let salt = recipes.get("recipe_1").unwrap().structured_ingredients().next().unwrap();
/// assert_eq!(salt.annotation.unwrap().frequency_percent, 100);
/// ```
pub fn analyze(recipes: &mut RecipeSet) {
    let total = recipes.len();
    if total < 2 {
        tracing::debug!("Skipping consensus analysis for {} recipe(s)", total);
        return;
    }

    let counts = ingredient_counts(recipes);
    let unique = counts.values().filter(|&&count| count == 1).count();
    tracing::debug!(
        "Analyzing {} recipes: {} distinct ingredients, {} unique",
        total,
        counts.len(),
        unique
    );

    for (key, record) in recipes.iter_mut() {
        if !record.is_normalized() {
            tracing::debug!("{} has unnormalized ingredients, leaving it unannotated", key);
            continue;
        }

        let highly_rated = is_highly_rated(record);
        for ingredient in record.structured_ingredients_mut() {
            let count = counts
                .get(&ingredient.ingredient_name)
                .copied()
                .unwrap_or(0);
            let frequency = frequency_percent(count, total);

            ingredient.annotation = Some(IngredientAnnotation {
                frequency_percent: frequency,
                consensus_level: ConsensusLevel::from_frequency(frequency),
                is_secret_ingredient: highly_rated && count == 1,
            });
        }
    }
}
