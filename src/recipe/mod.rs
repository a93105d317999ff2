//! Recipe records and cross-recipe ingredient analysis

mod analysis;
mod record;

pub use analysis::{
    analyze, frequency_percent, ingredient_counts, is_highly_rated, ESSENTIAL_THRESHOLD,
    FLAVOR_VARIANT_THRESHOLD, HIGH_RATING_THRESHOLD,
};
pub use record::{
    recipe_key, AggregateRating, ConsensusLevel, Ingredient, IngredientAnnotation,
    RawIngredient, RatingValue, RecipeRecord, RecipeSet,
};
