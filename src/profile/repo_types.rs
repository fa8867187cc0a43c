use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::tdee::{ActivityLevel, InvalidProfile, TdeeProfile};

/// Raw `user_profiles` row, before validation.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub user_id: Uuid,
    pub gender: String,
    pub age_years: i32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: f64,
    pub daily_calorie_goal: i32,
    pub water_goal_ml: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Onboarded user's profile. `daily_calorie_goal` caches `calculate_tdee(&tdee)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub tdee: TdeeProfile,
    pub daily_calorie_goal: i32,
    pub water_goal_ml: i32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = InvalidProfile;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let tdee = TdeeProfile {
            weight_kg: row.weight_kg,
            height_cm: row.height_cm,
            age_years: u32::try_from(row.age_years).map_err(|_| InvalidProfile::NonPositiveAge)?,
            gender: row.gender.parse()?,
            activity_level: ActivityLevel::try_from(row.activity_level)?,
        };
        tdee.validate()?;
        Ok(Self {
            user_id: row.user_id,
            tdee,
            daily_calorie_goal: row.daily_calorie_goal,
            water_goal_ml: row.water_goal_ml,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
