use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct WaterLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_ml: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
}
