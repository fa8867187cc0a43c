use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct AddWaterRequest {
    pub amount_ml: i32,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub logged_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyWater {
    pub date: String,
    pub amount_ml: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WaterSummary {
    pub date: String,
    pub daily_total_ml: i64,
    pub goal_ml: i32,
    pub remaining_ml: i64,
    pub goal_reached: bool,
    /// Seven days ending at `date`, oldest first.
    pub week: Vec<DailyWater>,
}
