use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::profile::{
    repo_types::{ProfileRow, UserProfile},
    services::ComputedProfile,
};

const COLUMNS: &str = "user_id, gender, age_years, weight_kg, height_cm, activity_level, \
                       daily_calorie_goal, water_goal_ml, created_at, updated_at";

fn age_column(computed: &ComputedProfile) -> anyhow::Result<i32> {
    i32::try_from(computed.tdee.age_years)
        .with_context(|| format!("age {} does not fit the profile row", computed.tdee.age_years))
}

fn into_profile(row: ProfileRow) -> anyhow::Result<UserProfile> {
    let user_id = row.user_id;
    UserProfile::try_from(row).with_context(|| format!("corrupt profile row for user {user_id}"))
}

impl UserProfile {
    pub async fn find(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        row.map(into_profile).transpose()
    }

    pub async fn exists(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM user_profiles WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(db)
                .await?;
        Ok(found)
    }

    /// Returns `None` when the user already has a profile.
    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        computed: &ComputedProfile,
    ) -> anyhow::Result<Option<UserProfile>> {
        let age = age_column(computed)?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO user_profiles
                (user_id, gender, age_years, weight_kg, height_cm, activity_level,
                 daily_calorie_goal, water_goal_ml)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(computed.tdee.gender.as_str())
        .bind(age)
        .bind(computed.tdee.weight_kg)
        .bind(computed.tdee.height_cm)
        .bind(computed.tdee.activity_level.multiplier())
        .bind(computed.daily_calorie_goal)
        .bind(computed.water_goal_ml)
        .fetch_optional(&mut **tx)
        .await?;
        row.map(into_profile).transpose()
    }

    /// Overwrites every attribute, the cached goal included.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        computed: &ComputedProfile,
    ) -> anyhow::Result<Option<UserProfile>> {
        let age = age_column(computed)?;
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            UPDATE user_profiles
            SET gender = $2, age_years = $3, weight_kg = $4, height_cm = $5,
                activity_level = $6, daily_calorie_goal = $7, water_goal_ml = $8,
                updated_at = now()
            WHERE user_id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(computed.tdee.gender.as_str())
        .bind(age)
        .bind(computed.tdee.weight_kg)
        .bind(computed.tdee.height_cm)
        .bind(computed.tdee.activity_level.multiplier())
        .bind(computed.daily_calorie_goal)
        .bind(computed.water_goal_ml)
        .fetch_optional(db)
        .await?;
        row.map(into_profile).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tdee::{ActivityLevel, Gender, TdeeProfile};

    fn computed(age_years: u32) -> ComputedProfile {
        ComputedProfile {
            tdee: TdeeProfile {
                weight_kg: 70.0,
                height_cm: 175.0,
                age_years,
                gender: Gender::Male,
                activity_level: ActivityLevel::Sedentary,
            },
            daily_calorie_goal: 2009,
            water_goal_ml: 2000,
        }
    }

    #[test]
    fn age_column_refuses_to_wrap() {
        assert_eq!(age_column(&computed(25)).unwrap(), 25);
        assert!(age_column(&computed(3_000_000_000)).is_err());
    }
}
