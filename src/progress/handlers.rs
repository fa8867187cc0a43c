use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    errors::{bad_request, internal, not_found, ApiError},
    feed::{ChangeEvent, Collection},
    progress::{
        dto::{NewMeasurement, ProgressResponse},
        repo_types::BodyMeasurement,
        services::{progress_overview, validate_measurement},
    },
    state::AppState,
};

pub fn progress_routes() -> Router<AppState> {
    Router::new()
        .route("/progress", get(list_progress).post(add_measurement))
        .route("/progress/:id", delete(delete_measurement))
}

#[instrument(skip(state))]
pub async fn list_progress(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProgressResponse>, ApiError> {
    let entries = BodyMeasurement::list(&state.db, user_id)
        .await
        .map_err(internal)?;
    Ok(Json(progress_overview(entries)))
}

#[instrument(skip(state, payload))]
pub async fn add_measurement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<NewMeasurement>,
) -> Result<(StatusCode, Json<BodyMeasurement>), ApiError> {
    validate_measurement(&payload).map_err(bad_request)?;
    let logged_at = payload.logged_at.unwrap_or_else(OffsetDateTime::now_utc);
    let entry = BodyMeasurement::insert(&state.db, user_id, &payload, logged_at)
        .await
        .map_err(internal)?;

    state.feed.publish(ChangeEvent::upsert(
        user_id,
        Collection::Progress,
        entry.id,
        &entry,
    ));
    info!(%user_id, weight_kg = entry.weight_kg, "measurement logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn delete_measurement(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !BodyMeasurement::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found("Measurement"));
    }
    state
        .feed
        .publish(ChangeEvent::delete(user_id, Collection::Progress, id));
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn invalid_body_fat_is_rejected() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        let app = progress_routes().with_state(state);
        let req = Request::post("/progress")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(r#"{"weight_kg":70.0,"body_fat_pct":120.0}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
