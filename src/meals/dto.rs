use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    meals::repo_types::{MealKind, MealSource},
    nutrition::Macros,
};

/// A proposed meal, not yet logged.
///
/// Returned by the analyze and compose endpoints and sent back unchanged (or
/// edited by the user) to `POST /meals` to confirm it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftMealEntry {
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub kind: MealKind,
    pub source: MealSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub entry: String,
    #[serde(default)]
    pub kind: MealKind,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmMealRequest {
    pub draft: DraftMealEntry,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMealRequest {
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub kind: MealKind,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}
