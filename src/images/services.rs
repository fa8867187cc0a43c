use anyhow::Context;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::state::AppState;

/// Lifetime of presigned photo URLs.
pub const PHOTO_URL_TTL_SECS: u64 = 10 * 60;

/// Every object key of `user_id`'s meal photos starts with this.
pub fn photo_key_prefix(user_id: Uuid) -> String {
    format!("meals/{}/", user_id)
}

pub fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

/// Stores a meal photo and returns its object key.
pub async fn upload_meal_photo(
    st: &AppState,
    user_id: Uuid,
    body: Bytes,
    content_type: &str,
) -> anyhow::Result<String> {
    let ext = ext_from_mime(content_type)
        .with_context(|| format!("unsupported image type {content_type}"))?;
    let key = format!("{}{}.{}", photo_key_prefix(user_id), Uuid::new_v4(), ext);
    let size = body.len();
    st.storage
        .put_object(&key, body, content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    info!(%user_id, %key, size, "meal photo stored");
    Ok(key)
}

pub async fn presign_photo(st: &AppState, key: &str) -> anyhow::Result<String> {
    st.storage
        .presign_get(key, PHOTO_URL_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))
}

/// Best effort: a failure is logged and otherwise ignored.
pub async fn delete_photo(st: &AppState, key: &str) {
    if let Err(e) = st.storage.delete_object(key).await {
        warn!(error = %e, %key, "failed to delete meal photo");
    }
}
