use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct BodyMeasurement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub weight_kg: f64,
    pub waist_cm: Option<f64>,
    pub body_fat_pct: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}
