use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::services::AuthUser,
    errors::{bad_request, internal, not_found, ApiError},
    feed::{ChangeEvent, Collection},
    pantry::{
        repo_types::Ingredient,
        services::{default_ingredients, validate_ingredient},
    },
    profile::{
        dto::{ActivityLevelOption, OnboardingRequest, ProfilePatch, ProfileResponse},
        repo_types::UserProfile,
        services::{apply_patch, onboard},
    },
    state::AppState,
    tdee::ActivityLevel,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/profile/activity-levels", get(activity_levels))
        .route("/profile/onboarding", post(complete_onboarding))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = UserProfile::find(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Profile"))?;
    Ok(Json(ProfileResponse::from(&profile)))
}

pub async fn activity_levels() -> Json<Vec<ActivityLevelOption>> {
    Json(
        ActivityLevel::ALL
            .into_iter()
            .map(|value| ActivityLevelOption {
                value,
                label: value.label(),
            })
            .collect(),
    )
}

/// Persists the profile, its goal and the initial pantry atomically.
#[instrument(skip(state, payload))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OnboardingRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), ApiError> {
    let computed = onboard(&payload).map_err(|e| {
        warn!(error = %e, %user_id, "onboarding rejected");
        bad_request(e)
    })?;

    let ingredients = match payload.ingredients {
        Some(items) => items
            .into_iter()
            .map(validate_ingredient)
            .collect::<Result<Vec<_>, _>>()
            .map_err(bad_request)?,
        None => default_ingredients(),
    };

    let mut tx = state.db.begin().await.map_err(internal)?;
    let Some(profile) = UserProfile::insert_tx(&mut tx, user_id, &computed)
        .await
        .map_err(internal)?
    else {
        warn!(%user_id, "onboarding already completed");
        return Err((StatusCode::CONFLICT, "Onboarding already completed".into()));
    };

    let mut pantry = Vec::with_capacity(ingredients.len());
    for input in &ingredients {
        pantry.push(
            Ingredient::insert_tx(&mut tx, user_id, input)
                .await
                .map_err(internal)?,
        );
    }
    tx.commit().await.map_err(internal)?;

    let response = ProfileResponse::from(&profile);
    state
        .feed
        .publish(ChangeEvent::upsert(user_id, Collection::Profile, user_id, &response));
    for ingredient in &pantry {
        state.feed.publish(ChangeEvent::upsert(
            user_id,
            Collection::Pantry,
            ingredient.id,
            ingredient,
        ));
    }

    info!(
        %user_id,
        goal = profile.daily_calorie_goal,
        pantry = pantry.len(),
        "onboarding completed"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let current = UserProfile::find(&state.db, user_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Profile"))?;

    let computed = apply_patch(&current.tdee, current.water_goal_ml, &patch).map_err(|e| {
        warn!(error = %e, %user_id, "profile update rejected");
        bad_request(e)
    })?;

    let updated = UserProfile::update(&state.db, user_id, &computed)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Profile"))?;

    let response = ProfileResponse::from(&updated);
    state
        .feed
        .publish(ChangeEvent::upsert(user_id, Collection::Profile, user_id, &response));
    info!(
        %user_id,
        old_goal = current.daily_calorie_goal,
        new_goal = updated.daily_calorie_goal,
        "profile updated"
    );
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use crate::tdee::{calculate_tdee, Gender, TdeeProfile};
    use axum::{body::Body, extract::FromRef, http::Request};
    use time::OffsetDateTime;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn bearer(state: &AppState) -> String {
        let token = JwtKeys::from_ref(state).sign_access(Uuid::new_v4()).unwrap();
        format!("Bearer {token}")
    }

    #[tokio::test]
    async fn activity_levels_lists_five_options() {
        let app = profile_routes().with_state(AppState::fake());
        let res = app
            .oneshot(Request::get("/profile/activity-levels").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let options: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let options = options.as_array().unwrap();
        assert_eq!(options.len(), 5);
        assert_eq!(options[0]["value"], 1.2);
        assert_eq!(options[0]["label"], "Sedentary");
        assert_eq!(options[4]["value"], 1.9);
    }

    #[tokio::test]
    async fn onboarding_requires_auth() {
        let app = profile_routes().with_state(AppState::fake());
        let req = Request::post("/profile/onboarding")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn onboarding_rejects_invalid_profile() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let app = profile_routes().with_state(state);
        let req = Request::post("/profile/onboarding")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(
                r#"{"gender":"male","age_years":25,"weight_kg":0,"height_cm":175,"activity_level":1.2}"#,
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"weight must be > 0");
    }

    #[tokio::test]
    async fn onboarding_rejects_implausible_age() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let app = profile_routes().with_state(state);
        let req = Request::post("/profile/onboarding")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(
                r#"{"gender":"male","age_years":3000000000,"weight_kg":70,"height_cm":175,"activity_level":1.2}"#,
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"age must be at most 150 years");
    }

    #[tokio::test]
    async fn onboarding_rejects_unknown_multiplier() {
        let state = AppState::fake();
        let auth = bearer(&state);
        let app = profile_routes().with_state(state);
        let req = Request::post("/profile/onboarding")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(
                r#"{"gender":"male","age_years":25,"weight_kg":70,"height_cm":175,"activity_level":1.3}"#,
            ))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert!(res.status().is_client_error());
    }

    #[test]
    fn goal_survives_response_round_trip() {
        let tdee = TdeeProfile {
            weight_kg: 60.0,
            height_cm: 165.0,
            age_years: 30,
            gender: Gender::Female,
            activity_level: ActivityLevel::ModeratelyActive,
        };
        let profile = UserProfile {
            user_id: Uuid::new_v4(),
            tdee,
            daily_calorie_goal: calculate_tdee(&tdee).unwrap(),
            water_goal_ml: 2000,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let response = ProfileResponse::from(&profile);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"daily_calorie_goal\":2046"));
        assert!(json.contains("\"activity_level\":1.55"));

        let back: ProfileResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back, response);
        assert_eq!(back.daily_calorie_goal, calculate_tdee(&tdee).unwrap());
    }
}
