//! Recipe record types
//!
//! A `RecipeRecord` is built from one schema.org JSON-LD object. Fields the
//! analysis needs are typed; everything else the page declared is kept in
//! `extra` and written back out untouched.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// Consensus tier of an ingredient across the accepted recipe set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConsensusLevel {
    /// Present in at least 60% of recipes
    Essential,
    /// Present in fewer than 40% of recipes
    #[serde(rename = "Flavor Variant")]
    FlavorVariant,
    /// The 40–59% band; never written to output
    Normal,
}

impl ConsensusLevel {
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Human-readable label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Essential => "Essential",
            Self::FlavorVariant => "Flavor Variant",
            Self::Normal => "Normal",
        }
    }
}

/// Cross-recipe statistics attached to one ingredient entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngredientAnnotation {
    pub frequency_percent: u8,
    #[serde(skip_serializing_if = "ConsensusLevel::is_normal")]
    pub consensus_level: ConsensusLevel,
    pub is_secret_ingredient: bool,
}

/// A normalized ingredient entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ingredient {
    pub ingredient_name: String,
    pub quantity: Option<String>,
    #[serde(flatten)]
    pub annotation: Option<IngredientAnnotation>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, quantity: Option<String>) -> Self {
        Self {
            ingredient_name: name.into(),
            quantity,
            annotation: None,
        }
    }

    /// Parses the `{ingredient_name, quantity}` object shape
    ///
    /// Returns `None` when the name is missing or blank.
    pub fn from_json(value: &Value) -> Option<Self> {
        let name = value.get("ingredient_name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        let quantity = match value.get("quantity") {
            Some(Value::String(s)) => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        Some(Self::new(name, quantity))
    }
}

/// One `recipeIngredient` entry, before or after normalization
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawIngredient {
    /// Free text as published by the page, e.g. "1 tsp salt"
    Text(String),
    /// Normalized by the external collaborator
    Structured(Ingredient),
}

impl RawIngredient {
    /// Text suitable for sending to the normalizer
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(ingredient) => match &ingredient.quantity {
                Some(quantity) if !quantity.is_empty() => {
                    format!("{} {}", quantity, ingredient.ingredient_name)
                }
                _ => ingredient.ingredient_name.clone(),
            },
        }
    }
}

/// `ratingValue`, which sites publish either as a number or a string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RatingValue {
    Number(f64),
    Text(String),
}

impl RatingValue {
    /// Coerces the rating to a float; unparseable text yields `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRating {
    #[serde(rename = "ratingValue", skip_serializing_if = "Option::is_none")]
    pub rating_value: Option<RatingValue>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AggregateRating {
    fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let rating_value = match object.get("ratingValue") {
            Some(Value::Number(n)) => n.as_f64().map(RatingValue::Number),
            Some(Value::String(s)) => Some(RatingValue::Text(s.clone())),
            _ => None,
        };
        let extra = object
            .iter()
            .filter(|(k, _)| k.as_str() != "ratingValue")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            rating_value,
            extra,
        })
    }
}

/// Keys the record types explicitly; everything else lands in `extra`
const TYPED_KEYS: &[&str] = &[
    "@type",
    "name",
    "aggregateRating",
    "recipeIngredient",
    "prepTime",
    "cookTime",
    "totalTime",
];

/// A recipe extracted from a page's structured data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRecord {
    /// Declared `@type`, kept in the shape the page used (string or list)
    #[serde(rename = "@type")]
    pub declared_type: Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "aggregateRating", skip_serializing_if = "Option::is_none")]
    pub aggregate_rating: Option<AggregateRating>,

    #[serde(rename = "recipeIngredient")]
    pub recipe_ingredient: Vec<RawIngredient>,

    #[serde(rename = "prepTime", skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,

    #[serde(rename = "cookTime", skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,

    #[serde(rename = "totalTime", skip_serializing_if = "Option::is_none")]
    pub total_time: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecipeRecord {
    /// Builds a record from a JSON-LD object
    ///
    /// Parsing is lenient: wrong-shaped optional fields are dropped rather than
    /// rejecting the record. Returns `None` only for non-objects. Checking the
    /// declared type is the extractor's job.
    pub fn from_json_ld(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let text = |key: &str| object.get(key).and_then(Value::as_str).map(str::to_string);

        let recipe_ingredient = match object.get("recipeIngredient") {
            Some(Value::Array(entries)) => entries.iter().filter_map(parse_ingredient).collect(),
            Some(entry @ Value::String(_)) => parse_ingredient(entry).into_iter().collect(),
            _ => Vec::new(),
        };

        let extra = object
            .iter()
            .filter(|(k, _)| !TYPED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            declared_type: object.get("@type").cloned().unwrap_or(Value::Null),
            name: text("name"),
            aggregate_rating: object
                .get("aggregateRating")
                .and_then(AggregateRating::from_json),
            recipe_ingredient,
            prep_time: text("prepTime"),
            cook_time: text("cookTime"),
            total_time: text("totalTime"),
            extra,
        })
    }

    /// The rating coerced to a float, if present and numeric
    pub fn rating(&self) -> Option<f64> {
        self.aggregate_rating
            .as_ref()?
            .rating_value
            .as_ref()?
            .as_f64()
    }

    /// True when every ingredient entry has the structured shape
    pub fn is_normalized(&self) -> bool {
        self.recipe_ingredient
            .iter()
            .all(|entry| matches!(entry, RawIngredient::Structured(_)))
    }

    pub fn ingredient_texts(&self) -> Vec<String> {
        self.recipe_ingredient
            .iter()
            .map(RawIngredient::display_text)
            .collect()
    }

    pub fn structured_ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.recipe_ingredient.iter().filter_map(|entry| match entry {
            RawIngredient::Structured(ingredient) => Some(ingredient),
            RawIngredient::Text(_) => None,
        })
    }

    pub fn structured_ingredients_mut(&mut self) -> impl Iterator<Item = &mut Ingredient> {
        self.recipe_ingredient
            .iter_mut()
            .filter_map(|entry| match entry {
                RawIngredient::Structured(ingredient) => Some(ingredient),
                RawIngredient::Text(_) => None,
            })
    }

    pub fn replace_ingredients(&mut self, ingredients: Vec<Ingredient>) {
        self.recipe_ingredient = ingredients
            .into_iter()
            .map(RawIngredient::Structured)
            .collect();
    }
}

fn parse_ingredient(value: &Value) -> Option<RawIngredient> {
    match value {
        Value::String(text) => {
            let text = text.trim();
            (!text.is_empty()).then(|| RawIngredient::Text(text.to_string()))
        }
        Value::Object(_) => Ingredient::from_json(value).map(RawIngredient::Structured),
        _ => None,
    }
}

/// Synthetic key of the `n`th accepted recipe (1-based)
pub fn recipe_key(n: usize) -> String {
    format!("recipe_{}", n)
}

/// Accepted recipes keyed `recipe_1`, `recipe_2`, ... in insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RecipeSet {
    recipes: IndexMap<String, RecipeRecord>,
}

impl RecipeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record under the next synthetic key and returns that key
    pub fn push(&mut self, record: RecipeRecord) -> String {
        let key = recipe_key(self.recipes.len() + 1);
        self.recipes.insert(key.clone(), record);
        key
    }

    /// Inserts under an explicit key, keeping its position if already present
    pub fn insert(&mut self, key: String, record: RecipeRecord) {
        self.recipes.insert(key, record);
    }

    pub fn get(&self, key: &str) -> Option<&RecipeRecord> {
        self.recipes.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut RecipeRecord> {
        self.recipes.get_mut(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<RecipeRecord> {
        self.recipes.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.recipes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.recipes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RecipeRecord)> {
        self.recipes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut RecipeRecord)> {
        self.recipes.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, RecipeRecord)> for RecipeSet {
    fn from_iter<I: IntoIterator<Item = (String, RecipeRecord)>>(iter: I) -> Self {
        Self {
            recipes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecipeSet {
    type Item = (String, RecipeRecord);
    type IntoIter = indexmap::map::IntoIter<String, RecipeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.recipes.into_iter()
    }
}
