use serde::Deserialize;
use uuid::Uuid;

use crate::meals::repo_types::MealKind;

/// Ingredient as entered by the user, per 100 g.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IngredientInput {
    pub name: String,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct PantryQuery {
    pub q: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ComposeItem {
    pub ingredient_id: Uuid,
    pub grams: f64,
}

#[derive(Debug, Deserialize)]
pub struct ComposeRequest {
    pub name: Option<String>,
    #[serde(default)]
    pub kind: MealKind,
    pub items: Vec<ComposeItem>,
}
