use std::collections::HashMap;

use thiserror::Error;
use time::Date;

use crate::{
    dates::{days_ending_at, utc_day},
    water::{
        dto::{DailyWater, WaterSummary},
        repo_types::WaterLog,
    },
};

pub const MAX_SINGLE_LOG_ML: i32 = 5000;

#[derive(Debug, Error, PartialEq)]
#[error("amount_ml must be between 1 and {MAX_SINGLE_LOG_ML}")]
pub struct InvalidAmount;

pub fn validate_amount(amount_ml: i32) -> Result<i32, InvalidAmount> {
    if (1..=MAX_SINGLE_LOG_ML).contains(&amount_ml) {
        Ok(amount_ml)
    } else {
        Err(InvalidAmount)
    }
}

/// Summary for `day` from the logs of the week ending at `day`.
pub fn summarize(day: Date, goal_ml: i32, logs: &[WaterLog]) -> WaterSummary {
    let mut per_day: HashMap<Date, i64> = HashMap::new();
    for log in logs {
        *per_day.entry(utc_day(log.logged_at)).or_default() += i64::from(log.amount_ml);
    }

    let week = days_ending_at(day, 7)
        .into_iter()
        .map(|d| DailyWater {
            date: d.to_string(),
            amount_ml: per_day.get(&d).copied().unwrap_or(0),
        })
        .collect();

    let total = per_day.get(&day).copied().unwrap_or(0);
    let goal = i64::from(goal_ml);
    WaterSummary {
        date: day.to_string(),
        daily_total_ml: total,
        goal_ml,
        remaining_ml: (goal - total).max(0),
        goal_reached: total >= goal,
        week,
    }
}
