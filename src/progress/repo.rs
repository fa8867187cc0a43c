use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::progress::{dto::NewMeasurement, repo_types::BodyMeasurement};

impl BodyMeasurement {
    /// All of the user's measurements, oldest first.
    pub async fn list(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<BodyMeasurement>> {
        let rows = sqlx::query_as::<_, BodyMeasurement>(
            r#"
            SELECT id, user_id, weight_kg, waist_cm, body_fat_pct, logged_at
            FROM body_measurements
            WHERE user_id = $1
            ORDER BY logged_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        m: &NewMeasurement,
        logged_at: OffsetDateTime,
    ) -> anyhow::Result<BodyMeasurement> {
        let row = sqlx::query_as::<_, BodyMeasurement>(
            r#"
            INSERT INTO body_measurements (user_id, weight_kg, waist_cm, body_fat_pct, logged_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, weight_kg, waist_cm, body_fat_pct, logged_at
            "#,
        )
        .bind(user_id)
        .bind(m.weight_kg)
        .bind(m.waist_cm)
        .bind(m.body_fat_pct)
        .bind(logged_at)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM body_measurements WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
