//! Total Daily Energy Expenditure estimator.
//!
//! The daily calorie goal is the Mifflin-St Jeor basal metabolic rate scaled by
//! one of five fixed activity multipliers, rounded half away from zero to the
//! nearest kcal. The goal is a pure function of [`TdeeProfile`]; callers cache
//! it on the profile record and recompute it whenever an input changes.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_WEIGHT_KG: f64 = 700.0;
pub const MAX_HEIGHT_CM: f64 = 300.0;
pub const MAX_AGE_YEARS: u32 = 150;

/// Rejected estimator input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidProfile {
    #[error("weight must be > 0")]
    NonPositiveWeight,
    #[error("height must be > 0")]
    NonPositiveHeight,
    #[error("age must be > 0")]
    NonPositiveAge,
    #[error("weight must be at most 700 kg")]
    WeightTooHigh,
    #[error("height must be at most 300 cm")]
    HeightTooHigh,
    #[error("age must be at most 150 years")]
    AgeTooHigh,
    #[error("profile does not yield a positive calorie goal")]
    GoalOutOfRange,
    #[error("unknown gender: {0}")]
    UnknownGender(String),
    #[error("unknown activity level: {0} (expected one of 1.2, 1.375, 1.55, 1.725, 1.9)")]
    UnknownActivityLevel(f64),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// Constant term of the Mifflin-St Jeor equation.
    fn bmr_offset(self) -> f64 {
        match self {
            Gender::Male => 5.0,
            Gender::Female => -161.0,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = InvalidProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(InvalidProfile::UnknownGender(other.to_string())),
        }
    }
}

/// Lifestyle activity level. Serialized as its numeric multiplier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "f64", into = "f64")]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    /// Every level, from least to most active.
    pub const ALL: [ActivityLevel; 5] = [
        ActivityLevel::Sedentary,
        ActivityLevel::LightlyActive,
        ActivityLevel::ModeratelyActive,
        ActivityLevel::VeryActive,
        ActivityLevel::ExtraActive,
    ];

    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "Sedentary",
            ActivityLevel::LightlyActive => "Lightly active",
            ActivityLevel::ModeratelyActive => "Moderately active",
            ActivityLevel::VeryActive => "Very active",
            ActivityLevel::ExtraActive => "Extra active",
        }
    }
}

impl TryFrom<f64> for ActivityLevel {
    type Error = InvalidProfile;

    /// Only the five enumerated multipliers are accepted, compared exactly.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        ActivityLevel::ALL
            .into_iter()
            .find(|level| level.multiplier() == value)
            .ok_or(InvalidProfile::UnknownActivityLevel(value))
    }
}

impl From<ActivityLevel> for f64 {
    fn from(level: ActivityLevel) -> Self {
        level.multiplier()
    }
}

/// Body parameters the daily calorie goal is derived from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TdeeProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
}

impl TdeeProfile {
    /// Rejects non-finite, non-positive and implausibly large body values.
    pub fn validate(&self) -> Result<(), InvalidProfile> {
        if !(self.weight_kg.is_finite() && self.weight_kg > 0.0) {
            return Err(InvalidProfile::NonPositiveWeight);
        }
        if self.weight_kg > MAX_WEIGHT_KG {
            return Err(InvalidProfile::WeightTooHigh);
        }
        if !(self.height_cm.is_finite() && self.height_cm > 0.0) {
            return Err(InvalidProfile::NonPositiveHeight);
        }
        if self.height_cm > MAX_HEIGHT_CM {
            return Err(InvalidProfile::HeightTooHigh);
        }
        if self.age_years == 0 {
            return Err(InvalidProfile::NonPositiveAge);
        }
        if self.age_years > MAX_AGE_YEARS {
            return Err(InvalidProfile::AgeTooHigh);
        }
        Ok(())
    }
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day, unvalidated.
pub fn basal_metabolic_rate(profile: &TdeeProfile) -> f64 {
    10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * f64::from(profile.age_years)
        + profile.gender.bmr_offset()
}

/// BMR scaled by the activity multiplier, before rounding.
pub fn unrounded_tdee(profile: &TdeeProfile) -> f64 {
    basal_metabolic_rate(profile) * profile.activity_level.multiplier()
}

/// Daily calorie goal in whole kcal.
///
/// Ties round away from zero, so 2008.5 becomes 2009. A body small and old
/// enough to give a goal below 1 kcal is rejected rather than clamped.
pub fn calculate_tdee(profile: &TdeeProfile) -> Result<i32, InvalidProfile> {
    profile.validate()?;
    let goal = unrounded_tdee(profile).round();
    if !(goal.is_finite() && goal >= 1.0 && goal <= f64::from(i32::MAX)) {
        return Err(InvalidProfile::GoalOutOfRange);
    }
    Ok(goal as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(
        weight_kg: f64,
        height_cm: f64,
        age_years: u32,
        gender: Gender,
        activity_level: ActivityLevel,
    ) -> TdeeProfile {
        TdeeProfile {
            weight_kg,
            height_cm,
            age_years,
            gender,
            activity_level,
        }
    }

    #[test]
    fn male_sedentary_rounds_half_away_from_zero() {
        let p = profile(70.0, 175.0, 25, Gender::Male, ActivityLevel::Sedentary);
        assert_eq!(basal_metabolic_rate(&p), 1673.75);
        assert_eq!(calculate_tdee(&p), Ok(2009));
    }

    #[test]
    fn female_moderately_active() {
        let p = profile(60.0, 165.0, 30, Gender::Female, ActivityLevel::ModeratelyActive);
        assert_eq!(basal_metabolic_rate(&p), 1320.25);
        assert_eq!(calculate_tdee(&p), Ok(2046));
    }

    #[test]
    fn strictly_increasing_with_activity() {
        let goals: Vec<i32> = ActivityLevel::ALL
            .into_iter()
            .map(|level| calculate_tdee(&profile(80.0, 180.0, 40, Gender::Male, level)).unwrap())
            .collect();
        assert!(goals.windows(2).all(|w| w[0] < w[1]), "{goals:?}");
    }

    #[test]
    fn strictly_increasing_with_weight() {
        for level in ActivityLevel::ALL {
            let lighter = calculate_tdee(&profile(60.0, 170.0, 35, Gender::Female, level)).unwrap();
            let heavier = calculate_tdee(&profile(61.0, 170.0, 35, Gender::Female, level)).unwrap();
            assert!(heavier > lighter);
        }
    }

    #[test]
    fn male_exceeds_female_by_scaled_offset() {
        for level in ActivityLevel::ALL {
            let male = profile(72.5, 168.0, 51, Gender::Male, level);
            let female = TdeeProfile {
                gender: Gender::Female,
                ..male
            };
            let expected = 166.0 * level.multiplier();

            let raw_diff = unrounded_tdee(&male) - unrounded_tdee(&female);
            assert!((raw_diff - expected).abs() < 1e-9, "{raw_diff} vs {expected}");

            let rounded_diff =
                f64::from(calculate_tdee(&male).unwrap() - calculate_tdee(&female).unwrap());
            assert!((rounded_diff - expected).abs() <= 1.0);
        }
    }

    #[test]
    fn same_profile_same_goal() {
        let p = profile(95.3, 190.5, 29, Gender::Male, ActivityLevel::VeryActive);
        assert_eq!(calculate_tdee(&p), calculate_tdee(&p));
    }

    #[test]
    fn rejects_non_positive_inputs() {
        let base = profile(70.0, 175.0, 25, Gender::Male, ActivityLevel::Sedentary);
        assert_eq!(
            calculate_tdee(&TdeeProfile { weight_kg: 0.0, ..base }),
            Err(InvalidProfile::NonPositiveWeight)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { weight_kg: -3.0, ..base }),
            Err(InvalidProfile::NonPositiveWeight)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { weight_kg: f64::NAN, ..base }),
            Err(InvalidProfile::NonPositiveWeight)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { height_cm: 0.0, ..base }),
            Err(InvalidProfile::NonPositiveHeight)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { age_years: 0, ..base }),
            Err(InvalidProfile::NonPositiveAge)
        );
        assert_eq!(
            InvalidProfile::NonPositiveWeight.to_string(),
            "weight must be > 0"
        );
    }

    #[test]
    fn rejects_oversized_inputs() {
        let base = profile(70.0, 175.0, 25, Gender::Male, ActivityLevel::Sedentary);
        assert_eq!(
            calculate_tdee(&TdeeProfile { age_years: 3_000_000_000, ..base }),
            Err(InvalidProfile::AgeTooHigh)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { age_years: u32::MAX, ..base }),
            Err(InvalidProfile::AgeTooHigh)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { weight_kg: 1e300, ..base }),
            Err(InvalidProfile::WeightTooHigh)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { weight_kg: f64::INFINITY, ..base }),
            Err(InvalidProfile::NonPositiveWeight)
        );
        assert_eq!(
            calculate_tdee(&TdeeProfile { height_cm: 301.0, ..base }),
            Err(InvalidProfile::HeightTooHigh)
        );
    }

    #[test]
    fn bounds_are_inclusive_and_fit_i32() {
        let largest = profile(
            MAX_WEIGHT_KG,
            MAX_HEIGHT_CM,
            1,
            Gender::Male,
            ActivityLevel::ExtraActive,
        );
        let goal = calculate_tdee(&largest).unwrap();
        assert!((16_000..17_000).contains(&goal));

        let oldest = profile(70.0, 175.0, MAX_AGE_YEARS, Gender::Female, ActivityLevel::Sedentary);
        assert!(calculate_tdee(&oldest).unwrap() > 0);
    }

    #[test]
    fn non_positive_goal_is_rejected_not_clamped() {
        let tiny = profile(1.0, 1.0, MAX_AGE_YEARS, Gender::Female, ActivityLevel::Sedentary);
        assert!(unrounded_tdee(&tiny) < 0.0);
        assert_eq!(calculate_tdee(&tiny), Err(InvalidProfile::GoalOutOfRange));
    }

    #[test]
    fn activity_level_accepts_only_enumerated_multipliers() {
        assert_eq!(ActivityLevel::try_from(1.55), Ok(ActivityLevel::ModeratelyActive));
        assert_eq!(
            ActivityLevel::try_from(1.5),
            Err(InvalidProfile::UnknownActivityLevel(1.5))
        );
        for level in ActivityLevel::ALL {
            assert_eq!(ActivityLevel::try_from(level.multiplier()), Ok(level));
        }
    }

    #[test]
    fn activity_level_serializes_as_multiplier() {
        let json = serde_json::to_string(&ActivityLevel::LightlyActive).unwrap();
        assert_eq!(json, "1.375");
        let parsed: ActivityLevel = serde_json::from_str("1.9").unwrap();
        assert_eq!(parsed, ActivityLevel::ExtraActive);
        assert!(serde_json::from_str::<ActivityLevel>("2.0").is_err());
    }

    #[test]
    fn gender_parses_known_values_only() {
        assert_eq!("female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!(
            "other".parse::<Gender>(),
            Err(InvalidProfile::UnknownGender("other".into()))
        );
        assert!(serde_json::from_str::<Gender>("\"other\"").is_err());
    }
}
