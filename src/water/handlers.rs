use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    dates::{day_bounds, parse_day, window_bounds},
    errors::{bad_request, internal, not_found, ApiError},
    feed::{ChangeEvent, Collection},
    meals::dto::DayQuery,
    profile::{repo_types::UserProfile, services::DEFAULT_WATER_GOAL_ML},
    state::AppState,
    water::{
        dto::{AddWaterRequest, WaterSummary},
        repo_types::WaterLog,
        services::{summarize, validate_amount},
    },
};

pub fn water_routes() -> Router<AppState> {
    Router::new()
        .route("/water", get(list_water).post(add_water))
        .route("/water/summary", get(water_summary))
        .route("/water/:id", delete(delete_water))
}

#[instrument(skip(state))]
pub async fn list_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<WaterLog>>, ApiError> {
    let day = parse_day(q.date.as_deref()).map_err(bad_request)?;
    let (start, end) = day_bounds(day).map_err(bad_request)?;
    let logs = WaterLog::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?;
    Ok(Json(logs))
}

#[instrument(skip(state, payload))]
pub async fn add_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AddWaterRequest>,
) -> Result<(StatusCode, Json<WaterLog>), ApiError> {
    let amount_ml = validate_amount(payload.amount_ml).map_err(bad_request)?;
    let logged_at = payload.logged_at.unwrap_or_else(OffsetDateTime::now_utc);
    let log = WaterLog::insert(&state.db, user_id, amount_ml, logged_at)
        .await
        .map_err(internal)?;

    state
        .feed
        .publish(ChangeEvent::upsert(user_id, Collection::Water, log.id, &log));
    info!(%user_id, amount_ml, "water logged");
    Ok((StatusCode::CREATED, Json(log)))
}

#[instrument(skip(state))]
pub async fn delete_water(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !WaterLog::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?
    {
        return Err(not_found("Water log"));
    }
    state
        .feed
        .publish(ChangeEvent::delete(user_id, Collection::Water, id));
    Ok(StatusCode::NO_CONTENT)
}

/// GET /water/summary?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn water_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<WaterSummary>, ApiError> {
    let day = parse_day(q.date.as_deref()).map_err(bad_request)?;
    let (start, end) = window_bounds(day, 7).map_err(bad_request)?;

    let goal_ml = UserProfile::find(&state.db, user_id)
        .await
        .map_err(internal)?
        .map(|p| p.water_goal_ml)
        .unwrap_or(DEFAULT_WATER_GOAL_ML);
    let logs = WaterLog::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?;

    Ok(Json(summarize(day, goal_ml, &logs)))
}
