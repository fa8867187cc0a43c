use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    dates::{day_bounds, parse_day},
    errors::{bad_request, internal, not_found, ApiError},
    feed::{ChangeEvent, Collection},
    images::services::{delete_photo, ext_from_mime, presign_photo, upload_meal_photo},
    meals::{
        dto::{AnalyzeTextRequest, ConfirmMealRequest, DayQuery, DraftMealEntry, UpdateMealRequest},
        repo,
        repo_types::{MealEntry, MealKind, MealSource},
        services::{draft_from_estimate, validate_draft, validate_update},
    },
    state::AppState,
};

const MAX_PHOTO_BYTES: usize = 20 * 1024 * 1024;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals))
        .route("/meals/:id", get(get_meal))
        .route("/meals/:id/photo", get(get_photo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", post(confirm_meal))
        .route(
            "/meals/:id",
            axum::routing::put(update_meal).delete(delete_meal),
        )
        .route("/meals/analyze/text", post(analyze_text))
        .route(
            "/meals/analyze/photo",
            post(analyze_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
}

/// POST /meals/analyze/photo (multipart: `photo`, optional `kind`)
///
/// Stores the photo and returns the oracle's draft carrying its key.
#[instrument(skip(state, mp))]
pub async fn analyze_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<DraftMealEntry>, ApiError> {
    let mut photo = None;
    let mut kind = MealKind::default();
    while let Some(field) = mp.next_field().await.map_err(bad_request)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("photo") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field.bytes().await.map_err(bad_request)?;
                photo = Some((data, content_type));
            }
            Some("kind") => {
                let raw = field.text().await.map_err(bad_request)?;
                kind = raw.trim().parse().map_err(bad_request)?;
            }
            _ => {}
        }
    }

    let Some((data, content_type)) = photo else {
        return Err(bad_request("photo is required"));
    };
    if data.is_empty() {
        return Err(bad_request("photo is empty"));
    }
    if ext_from_mime(&content_type).is_none() {
        warn!(%user_id, %content_type, "unsupported photo type");
        return Err(bad_request(format!("unsupported image type {content_type}")));
    }

    let key = upload_meal_photo(&state, user_id, data.clone(), &content_type)
        .await
        .map_err(internal)?;

    let estimate = match state.inference.analyze_image(data, &content_type).await {
        Ok(estimate) => estimate,
        Err(e) => {
            warn!(error = %e, %user_id, "photo analysis failed");
            delete_photo(&state, &key).await;
            return Err(e.into_api_error());
        }
    };

    info!(%user_id, food = %estimate.food_name, calories = estimate.calories, "photo analyzed");
    Ok(Json(draft_from_estimate(
        estimate,
        MealSource::Photo,
        kind,
        Some(key),
    )))
}

/// POST /meals/analyze/text { entry, kind? }
#[instrument(skip(state, payload))]
pub async fn analyze_text(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AnalyzeTextRequest>,
) -> Result<Json<DraftMealEntry>, ApiError> {
    let entry = payload.entry.trim();
    if entry.is_empty() {
        return Err(bad_request("entry is required"));
    }

    let estimate = state.inference.analyze_text(entry).await.map_err(|e| {
        warn!(error = %e, %user_id, "text analysis failed");
        e.into_api_error()
    })?;

    Ok(Json(draft_from_estimate(
        estimate,
        MealSource::Manual,
        payload.kind,
        None,
    )))
}

/// POST /meals { draft, logged_at? }
#[instrument(skip(state, payload))]
pub async fn confirm_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<ConfirmMealRequest>,
) -> Result<(StatusCode, Json<MealEntry>), ApiError> {
    let draft = validate_draft(user_id, payload.draft).map_err(|e| {
        warn!(error = %e, %user_id, "draft rejected");
        bad_request(e)
    })?;
    let logged_at = payload.logged_at.unwrap_or_else(OffsetDateTime::now_utc);

    let Some(entry) = repo::insert(&state.db, user_id, &draft, logged_at)
        .await
        .map_err(internal)?
    else {
        warn!(%user_id, image_key = ?draft.image_key, "photo already logged");
        return Err((StatusCode::CONFLICT, "Photo already logged".into()));
    };

    state
        .feed
        .publish(ChangeEvent::upsert(user_id, Collection::Meals, entry.id, &entry));
    info!(%user_id, meal_id = %entry.id, source = entry.source.as_str(), "meal logged");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /meals?date=YYYY-MM-DD
#[instrument(skip(state))]
pub async fn list_meals(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<MealEntry>>, ApiError> {
    let day = parse_day(q.date.as_deref()).map_err(bad_request)?;
    let (start, end) = day_bounds(day).map_err(bad_request)?;
    let meals = repo::list_between(&state.db, user_id, start, end)
        .await
        .map_err(internal)?;
    Ok(Json(meals))
}

#[instrument(skip(state))]
pub async fn get_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MealEntry>, ApiError> {
    repo::find(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .map(Json)
        .ok_or_else(|| not_found("Meal"))
}

#[instrument(skip(state, payload))]
pub async fn update_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMealRequest>,
) -> Result<Json<MealEntry>, ApiError> {
    let req = validate_update(payload).map_err(bad_request)?;
    let entry = repo::update(&state.db, user_id, id, &req)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Meal"))?;

    state
        .feed
        .publish(ChangeEvent::upsert(user_id, Collection::Meals, entry.id, &entry));
    Ok(Json(entry))
}

#[instrument(skip(state))]
pub async fn delete_meal(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let image_key = repo::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Meal"))?;

    if let Some(key) = image_key {
        delete_photo(&state, &key).await;
    }
    state
        .feed
        .publish(ChangeEvent::delete(user_id, Collection::Meals, id));
    info!(%user_id, meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 307 to a short-lived presigned URL of the entry's photo.
#[instrument(skip(state))]
pub async fn get_photo(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let entry = repo::find(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found("Meal"))?;
    let key = entry.image_key.ok_or_else(|| not_found("Photo"))?;
    let url = presign_photo(&state, &key).await.map_err(internal)?;
    Ok(Redirect::temporary(&url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::JwtKeys;
    use axum::{body::Body, extract::FromRef, http::Request, Router};
    use tower::ServiceExt;

    fn app() -> (Router, String) {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign_access(Uuid::new_v4()).unwrap();
        (
            crate::meals::router().with_state(state),
            format!("Bearer {token}"),
        )
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn text_analysis_returns_manual_draft() {
        let (app, auth) = app();
        let req = Request::post("/meals/analyze/text")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(r#"{"entry":"1 medium apple","kind":"snack"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let draft = body_json(res).await;
        assert_eq!(draft["name"], "1 medium apple");
        assert_eq!(draft["calories"], 52.0);
        assert_eq!(draft["source"], "manual");
        assert_eq!(draft["kind"], "snack");
        assert_eq!(draft["description"], "Manually added meal");
        assert!(draft.get("image_key").is_none());
    }

    #[tokio::test]
    async fn unrecognized_text_is_unprocessable() {
        let (app, auth) = app();
        let req = Request::post("/meals/analyze/text")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(r#"{"entry":"a rock"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn blank_text_is_rejected() {
        let (app, auth) = app();
        let req = Request::post("/meals/analyze/text")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(r#"{"entry":"   "}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn photo_analysis_returns_draft_with_key() {
        let (app, auth) = app();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"toast.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n\
             fakejpegbytes\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"kind\"\r\n\r\n\
             breakfast\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::post("/meals/analyze/photo")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .header("authorization", auth)
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let draft = body_json(res).await;
        assert_eq!(draft["name"], "Avocado & egg toast");
        assert_eq!(draft["source"], "photo");
        assert_eq!(draft["kind"], "breakfast");
        let key = draft["image_key"].as_str().unwrap();
        assert!(key.starts_with("meals/") && key.ends_with(".jpg"));
    }

    #[tokio::test]
    async fn photo_analysis_rejects_non_images() {
        let (app, auth) = app();
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"photo\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             hello\r\n\
             --{boundary}--\r\n"
        );
        let req = Request::post("/meals/analyze/photo")
            .header("content-type", format!("multipart/form-data; boundary={boundary}"))
            .header("authorization", auth)
            .body(Body::from(body))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn confirm_rejects_foreign_photo_key() {
        let (app, auth) = app();
        let body = serde_json::json!({
            "draft": {
                "name": "Toast",
                "description": null,
                "calories": 300.0,
                "macros": {"protein_g": 10.0, "carbs_g": 30.0, "fat_g": 12.0},
                "source": "photo",
                "image_key": format!("meals/{}/x.jpg", Uuid::new_v4()),
            }
        });
        let req = Request::post("/meals")
            .header("content-type", "application/json")
            .header("authorization", auth)
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_rejects_last_representable_day() {
        let (app, auth) = app();
        let req = Request::get("/meals?date=9999-12-31")
            .header("authorization", auth)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_rejects_malformed_date() {
        let (app, auth) = app();
        let req = Request::get("/meals?date=03-10-2024")
            .header("authorization", auth)
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
