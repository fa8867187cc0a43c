use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::water::repo_types::WaterLog;

impl WaterLog {
    /// Logs in `[start, end)`, oldest first.
    pub async fn list_between(
        db: &PgPool,
        user_id: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> anyhow::Result<Vec<WaterLog>> {
        let rows = sqlx::query_as::<_, WaterLog>(
            r#"
            SELECT id, user_id, amount_ml, logged_at
            FROM water_logs
            WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
            ORDER BY logged_at ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        amount_ml: i32,
        logged_at: OffsetDateTime,
    ) -> anyhow::Result<WaterLog> {
        let row = sqlx::query_as::<_, WaterLog>(
            r#"
            INSERT INTO water_logs (user_id, amount_ml, logged_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, amount_ml, logged_at
            "#,
        )
        .bind(user_id)
        .bind(amount_ml)
        .bind(logged_at)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM water_logs WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}
