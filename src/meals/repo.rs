use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::meals::{
    dto::{DraftMealEntry, UpdateMealRequest},
    repo_types::{MealEntry, MealRow},
};

const COLUMNS: &str = "id, user_id, name, description, calories, protein_g, carbs_g, fat_g, \
                       kind, source, image_key, logged_at, created_at";

fn into_entries(rows: Vec<MealRow>) -> anyhow::Result<Vec<MealEntry>> {
    rows.into_iter().map(MealEntry::try_from).collect()
}

/// Entries logged in `[start, end)`, newest first.
pub async fn list_between(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<MealEntry>> {
    let rows = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        SELECT {COLUMNS}
        FROM meal_entries
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
        ORDER BY logged_at DESC, created_at DESC
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .fetch_all(db)
    .await?;
    into_entries(rows)
}

pub async fn find(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<MealEntry>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        "SELECT {COLUMNS} FROM meal_entries WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    row.map(MealEntry::try_from).transpose()
}

fn insert_sql() -> String {
    format!(
        r#"
        INSERT INTO meal_entries
            (user_id, name, description, calories, protein_g, carbs_g, fat_g,
             kind, source, image_key, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (image_key) DO NOTHING
        RETURNING {COLUMNS}
        "#
    )
}

/// `None` when the draft's photo already belongs to another entry.
pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    draft: &DraftMealEntry,
    logged_at: OffsetDateTime,
) -> anyhow::Result<Option<MealEntry>> {
    let row = sqlx::query_as::<_, MealRow>(&insert_sql())
    .bind(user_id)
    .bind(&draft.name)
    .bind(&draft.description)
    .bind(draft.calories)
    .bind(draft.macros.protein_g)
    .bind(draft.macros.carbs_g)
    .bind(draft.macros.fat_g)
    .bind(draft.kind.as_str())
    .bind(draft.source.as_str())
    .bind(&draft.image_key)
    .bind(logged_at)
    .fetch_optional(db)
    .await?;
    row.map(MealEntry::try_from).transpose()
}

pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    req: &UpdateMealRequest,
) -> anyhow::Result<Option<MealEntry>> {
    let row = sqlx::query_as::<_, MealRow>(&format!(
        r#"
        UPDATE meal_entries
        SET name = $3, description = $4, calories = $5,
            protein_g = $6, carbs_g = $7, fat_g = $8, kind = $9
        WHERE id = $1 AND user_id = $2
        RETURNING {COLUMNS}
        "#
    ))
    .bind(id)
    .bind(user_id)
    .bind(&req.name)
    .bind(&req.description)
    .bind(req.calories)
    .bind(req.macros.protein_g)
    .bind(req.macros.carbs_g)
    .bind(req.macros.fat_g)
    .bind(req.kind.as_str())
    .fetch_optional(db)
    .await?;
    row.map(MealEntry::try_from).transpose()
}

/// `None` when nothing was deleted; otherwise the removed entry's photo key.
pub async fn delete(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<Option<String>>> {
    let key = sqlx::query_scalar::<_, Option<String>>(
        "DELETE FROM meal_entries WHERE id = $1 AND user_id = $2 RETURNING image_key",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_keys_are_unique_per_entry() {
        let schema = include_str!("../../migrations/0001_init.sql");
        assert!(schema.contains("image_key   TEXT UNIQUE"));
        assert!(insert_sql().contains("ON CONFLICT (image_key) DO NOTHING"));
    }
}
