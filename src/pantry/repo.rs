use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::pantry::{dto::IngredientInput, repo_types::Ingredient};

impl Ingredient {
    /// Ordered by name; `search` is a case-insensitive substring match.
    pub async fn list(
        db: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<Ingredient>> {
        let pattern = search.map(|s| format!("%{}%", escape_like(s)));
        let rows = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, created_at
            FROM pantry_ingredients
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR name ILIKE $2)
            ORDER BY lower(name), created_at
            "#,
        )
        .bind(user_id)
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Only the caller's ingredients are returned; unknown ids are skipped.
    pub async fn list_by_ids(
        db: &PgPool,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> anyhow::Result<Vec<Ingredient>> {
        let rows = sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, calories, protein_g, carbs_g, fat_g, created_at
            FROM pantry_ingredients
            WHERE user_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        input: &IngredientInput,
    ) -> anyhow::Result<Ingredient> {
        let row = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO pantry_ingredients (user_id, name, calories, protein_g, carbs_g, fat_g)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbs_g)
        .bind(input.fat_g)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        input: &IngredientInput,
    ) -> anyhow::Result<Ingredient> {
        let row = sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO pantry_ingredients (user_id, name, calories, protein_g, carbs_g, fat_g)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g, created_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbs_g)
        .bind(input.fat_g)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row)
    }

    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        input: &IngredientInput,
    ) -> anyhow::Result<Option<Ingredient>> {
        let row = sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE pantry_ingredients
            SET name = $3, calories = $4, protein_g = $5, carbs_g = $6, fat_g = $7
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, calories, protein_g, carbs_g, fat_g, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&input.name)
        .bind(input.calories)
        .bind(input.protein_g)
        .bind(input.carbs_g)
        .bind(input.fat_g)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Returns whether a row was removed.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM pantry_ingredients WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

fn escape_like(raw: &str) -> String {
    raw.trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
