use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    errors::{bad_request, internal, not_found, ApiError},
    feed::{ChangeEvent, Collection},
    meals::dto::DraftMealEntry,
    pantry::{
        dto::{ComposeRequest, IngredientInput, PantryQuery},
        repo_types::Ingredient,
        services::{compose_meal, validate_ingredient},
    },
    state::AppState,
};

pub fn pantry_routes() -> Router<AppState> {
    Router::new()
        .route("/pantry", get(list_ingredients).post(create_ingredient))
        .route("/pantry/:id", put(update_ingredient).delete(delete_ingredient))
        .route("/pantry/compose", post(compose))
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<PantryQuery>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let items = Ingredient::list(&state.db, user_id, search)
        .await
        .map_err(internal)?;
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<IngredientInput>,
) -> Result<(StatusCode, Json<Ingredient>), ApiError> {
    let input = validate_ingredient(payload).map_err(bad_request)?;
    let ingredient = Ingredient::insert(&state.db, user_id, &input)
        .await
        .map_err(internal)?;

    state.feed.publish(ChangeEvent::upsert(
        user_id,
        Collection::Pantry,
        ingredient.id,
        &ingredient,
    ));
    info!(%user_id, ingredient_id = %ingredient.id, "ingredient added");
    Ok((StatusCode::CREATED, Json(ingredient)))
}

#[instrument(skip(state, payload))]
pub async fn update_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientInput>,
) -> Result<Json<Ingredient>, ApiError> {
    let input = validate_ingredient(payload).map_err(bad_request)?;
    let ingredient = Ingredient::update(&state.db, user_id, id, &input)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Ingredient"))?;

    state.feed.publish(ChangeEvent::upsert(
        user_id,
        Collection::Pantry,
        ingredient.id,
        &ingredient,
    ));
    Ok(Json(ingredient))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Ingredient::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found("Ingredient"));
    }
    state
        .feed
        .publish(ChangeEvent::delete(user_id, Collection::Pantry, id));
    info!(%user_id, ingredient_id = %id, "ingredient removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Proposes a meal from weighed pantry ingredients; nothing is persisted.
#[instrument(skip(state, payload))]
pub async fn compose(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ComposeRequest>,
) -> Result<Json<DraftMealEntry>, ApiError> {
    let ids: Vec<Uuid> = payload.items.iter().map(|i| i.ingredient_id).collect();
    let pantry = if ids.is_empty() {
        Vec::new()
    } else {
        Ingredient::list_by_ids(&state.db, user_id, &ids)
            .await
            .map_err(internal)?
    };

    let draft = compose_meal(&pantry, &payload.items, payload.name.as_deref(), payload.kind)
        .map_err(|e| {
            warn!(error = %e, %user_id, "compose rejected");
            bad_request(e)
        })?;
    Ok(Json(draft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn pantry_requires_auth() {
        let app = pantry_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::get("/pantry").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn blank_ingredient_name_is_rejected() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let app = pantry_routes().with_state(state);
        let req = Request::post("/pantry")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(
                r#"{"name":"  ","calories":100,"protein_g":1,"carbs_g":1,"fat_g":1}"#,
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_composition_is_rejected() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let app = pantry_routes().with_state(state);
        let req = Request::post("/pantry/compose")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(r#"{"items":[]}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
