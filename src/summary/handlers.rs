use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::services::AuthUser,
    dates::{day_bounds, parse_day, window_bounds},
    errors::{bad_request, internal, not_found, ApiError},
    meals::{dto::DayQuery, repo as meals_repo},
    profile::repo_types::UserProfile,
    state::AppState,
    summary::{
        dto::{DailySummary, WeekQuery, WeeklySummary},
        services::{daily_summary, weekly_summary},
    },
    water::repo_types::WaterLog,
};

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/summary/daily", get(daily))
        .route("/summary/weekly", get(weekly))
}

async fn calorie_goal(state: &AppState, user_id: uuid::Uuid) -> Result<i32, ApiError> {
    UserProfile::find(&state.db, user_id)
        .await
        .map_err(internal)?
        .map(|p| p.daily_calorie_goal)
        .ok_or_else(|| not_found("Profile"))
}

/// GET /summary/daily?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<DailySummary>, ApiError> {
    let day = parse_day(q.date.as_deref()).map_err(bad_request)?;
    let (start, end) = day_bounds(day).map_err(bad_request)?;
    let goal = calorie_goal(&state, user_id).await?;

    let meals = meals_repo::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?;
    let water_ml: i64 = WaterLog::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?
        .iter()
        .map(|log| i64::from(log.amount_ml))
        .sum();

    Ok(Json(daily_summary(day, goal, &meals, water_ml)))
}

/// GET /summary/weekly?end=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeeklySummary>, ApiError> {
    let end_day = parse_day(q.end.as_deref()).map_err(bad_request)?;
    let (start, end) = window_bounds(end_day, 7).map_err(bad_request)?;
    let goal = calorie_goal(&state, user_id).await?;

    let meals = meals_repo::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?;

    Ok(Json(weekly_summary(end_day, goal, &meals)))
}
