use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    pantry::dto::IngredientInput,
    profile::repo_types::UserProfile,
    tdee::{ActivityLevel, Gender},
};

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub gender: Gender,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    /// Initial pantry; the default pantry is seeded when absent.
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientInput>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub gender: Option<Gender>,
    pub age_years: Option<u32>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub activity_level: Option<ActivityLevel>,
    pub water_goal_ml: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub gender: Gender,
    pub age_years: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub activity_label: String,
    pub daily_calorie_goal: i32,
    pub water_goal_ml: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&UserProfile> for ProfileResponse {
    fn from(p: &UserProfile) -> Self {
        Self {
            user_id: p.user_id,
            gender: p.tdee.gender,
            age_years: p.tdee.age_years,
            weight_kg: p.tdee.weight_kg,
            height_cm: p.tdee.height_cm,
            activity_level: p.tdee.activity_level,
            activity_label: p.tdee.activity_level.label().to_string(),
            daily_calorie_goal: p.daily_calorie_goal,
            water_goal_ml: p.water_goal_ml,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityLevelOption {
    pub value: ActivityLevel,
    pub label: &'static str,
}
