use thiserror::Error;

use crate::{
    profile::dto::{OnboardingRequest, ProfilePatch},
    tdee::{calculate_tdee, InvalidProfile, TdeeProfile},
};

pub const DEFAULT_WATER_GOAL_ML: i32 = 2000;
const MAX_WATER_GOAL_ML: i32 = 20_000;

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error(transparent)]
    Invalid(#[from] InvalidProfile),
    #[error("water goal must be between 1 and {MAX_WATER_GOAL_ML} ml")]
    WaterGoal,
}

/// Validated profile attributes plus the goal derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedProfile {
    pub tdee: TdeeProfile,
    pub daily_calorie_goal: i32,
    pub water_goal_ml: i32,
}

impl ComputedProfile {
    fn compute(tdee: TdeeProfile, water_goal_ml: i32) -> Result<Self, ProfileError> {
        if !(1..=MAX_WATER_GOAL_ML).contains(&water_goal_ml) {
            return Err(ProfileError::WaterGoal);
        }
        Ok(Self {
            daily_calorie_goal: calculate_tdee(&tdee)?,
            tdee,
            water_goal_ml,
        })
    }
}

pub fn onboard(req: &OnboardingRequest) -> Result<ComputedProfile, ProfileError> {
    let tdee = TdeeProfile {
        weight_kg: req.weight_kg,
        height_cm: req.height_cm,
        age_years: req.age_years,
        gender: req.gender,
        activity_level: req.activity_level,
    };
    ComputedProfile::compute(tdee, DEFAULT_WATER_GOAL_ML)
}

/// Merges `patch` over the current attributes and recomputes the goal.
pub fn apply_patch(
    current: &TdeeProfile,
    current_water_goal_ml: i32,
    patch: &ProfilePatch,
) -> Result<ComputedProfile, ProfileError> {
    let tdee = TdeeProfile {
        weight_kg: patch.weight_kg.unwrap_or(current.weight_kg),
        height_cm: patch.height_cm.unwrap_or(current.height_cm),
        age_years: patch.age_years.unwrap_or(current.age_years),
        gender: patch.gender.unwrap_or(current.gender),
        activity_level: patch.activity_level.unwrap_or(current.activity_level),
    };
    ComputedProfile::compute(tdee, patch.water_goal_ml.unwrap_or(current_water_goal_ml))
}
