use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::progress::repo_types::BodyMeasurement;

#[derive(Debug, Clone, Deserialize)]
pub struct NewMeasurement {
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub body_fat_pct: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub entries: Vec<BodyMeasurement>,
    pub latest: Option<BodyMeasurement>,
    /// Latest minus first weight; absent with fewer than two entries.
    pub weight_change_kg: Option<f64>,
}
