use std::collections::HashMap;

use thiserror::Error;
use uuid::Uuid;

use crate::{
    meals::{
        dto::DraftMealEntry,
        repo_types::{MealKind, MealSource},
    },
    nutrition::{is_valid_amount, round_to, Macros},
    pantry::{
        dto::{ComposeItem, IngredientInput},
        repo_types::Ingredient,
    },
};

#[derive(Debug, Error, PartialEq)]
pub enum IngredientError {
    #[error("ingredient name is required")]
    EmptyName,
    #[error("{0} must be a non-negative number")]
    InvalidAmount(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum ComposeError {
    #[error("at least one ingredient is required")]
    Empty,
    #[error("grams must be > 0")]
    NonPositiveGrams,
    #[error("unknown ingredient {0}")]
    UnknownIngredient(Uuid),
}

/// Trims the name and checks every value is finite and non-negative.
pub fn validate_ingredient(input: IngredientInput) -> Result<IngredientInput, IngredientError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(IngredientError::EmptyName);
    }
    for (field, value) in [
        ("calories", input.calories),
        ("protein_g", input.protein_g),
        ("carbs_g", input.carbs_g),
        ("fat_g", input.fat_g),
    ] {
        if !is_valid_amount(value) {
            return Err(IngredientError::InvalidAmount(field));
        }
    }
    Ok(IngredientInput { name, ..input })
}

/// Pantry seeded at onboarding when the user brings none.
pub fn default_ingredients() -> Vec<IngredientInput> {
    vec![
        IngredientInput {
            name: "Brown rice".into(),
            calories: 350.0,
            protein_g: 7.0,
            carbs_g: 75.0,
            fat_g: 2.0,
        },
        IngredientInput {
            name: "Chicken breast".into(),
            calories: 165.0,
            protein_g: 31.0,
            carbs_g: 0.0,
            fat_g: 3.6,
        },
    ]
}

/// Builds a draft from weighed pantry ingredients.
///
/// Each ingredient contributes `value * grams / 100`. Calories are rounded to
/// the nearest kcal and macros to 0.1 g after summing.
pub fn compose_meal(
    pantry: &[Ingredient],
    items: &[ComposeItem],
    name: Option<&str>,
    kind: MealKind,
) -> Result<DraftMealEntry, ComposeError> {
    if items.is_empty() {
        return Err(ComposeError::Empty);
    }
    let by_id: HashMap<Uuid, &Ingredient> = pantry.iter().map(|i| (i.id, i)).collect();

    let mut calories = 0.0;
    let mut macros = Macros::default();
    let mut names: Vec<&str> = Vec::with_capacity(items.len());
    for item in items {
        if !(item.grams.is_finite() && item.grams > 0.0) {
            return Err(ComposeError::NonPositiveGrams);
        }
        let ingredient = by_id
            .get(&item.ingredient_id)
            .ok_or(ComposeError::UnknownIngredient(item.ingredient_id))?;
        let factor = item.grams / 100.0;
        calories += ingredient.calories * factor;
        macros = macros + ingredient.macros().scaled(factor);
        if !names.contains(&ingredient.name.as_str()) {
            names.push(&ingredient.name);
        }
    }

    let name = name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| names.join(", "));

    Ok(DraftMealEntry {
        name,
        description: Some(
            items
                .iter()
                .filter_map(|item| {
                    by_id
                        .get(&item.ingredient_id)
                        .map(|i| format!("{} g {}", round_to(item.grams, 1), i.name))
                })
                .collect::<Vec<_>>()
                .join(", "),
        ),
        calories: round_to(calories, 0),
        macros: macros.rounded(1),
        kind,
        source: MealSource::Pantry,
        image_key: None,
    })
}
