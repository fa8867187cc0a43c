use serde::{Deserialize, Serialize};

use crate::nutrition::Macros;

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailySummary {
    pub date: String,
    pub calories: f64,
    pub macros: Macros,
    pub goal: i32,
    pub calories_left: f64,
    pub goal_percent: i32,
    pub meal_count: usize,
    pub water_ml: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayCalories {
    pub date: String,
    pub calories: f64,
    pub goal_percent: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklySummary {
    pub end: String,
    pub goal: i32,
    /// Oldest first; days without meals are zero.
    pub days: Vec<DayCalories>,
    pub average_calories: f64,
}
