use std::collections::HashMap;

use time::Date;

use crate::{
    dates::{days_ending_at, utc_day},
    meals::repo_types::MealEntry,
    nutrition::{round_to, Macros},
};

use super::dto::{DailySummary, DayCalories, WeeklySummary};

/// Share of the goal consumed, in whole percent; 0 for a non-positive goal.
pub fn goal_percent(consumed: f64, goal: i32) -> i32 {
    if goal <= 0 {
        return 0;
    }
    (consumed / f64::from(goal) * 100.0).round() as i32
}

/// `meals` outside `day` are ignored.
pub fn daily_summary(day: Date, goal: i32, meals: &[MealEntry], water_ml: i64) -> DailySummary {
    let todays: Vec<&MealEntry> = meals.iter().filter(|m| utc_day(m.logged_at) == day).collect();
    let calories: f64 = todays.iter().map(|m| m.calories).sum();
    let macros = todays
        .iter()
        .fold(Macros::default(), |acc, m| acc + m.macros);

    DailySummary {
        date: day.to_string(),
        calories: round_to(calories, 0),
        macros: macros.rounded(1),
        goal,
        calories_left: round_to((f64::from(goal) - calories).max(0.0), 0),
        goal_percent: goal_percent(calories, goal),
        meal_count: todays.len(),
        water_ml,
    }
}

pub fn weekly_summary(end: Date, goal: i32, meals: &[MealEntry]) -> WeeklySummary {
    let mut per_day: HashMap<Date, f64> = HashMap::new();
    for meal in meals {
        *per_day.entry(utc_day(meal.logged_at)).or_default() += meal.calories;
    }

    let days: Vec<DayCalories> = days_ending_at(end, 7)
        .into_iter()
        .map(|d| {
            let calories = per_day.get(&d).copied().unwrap_or(0.0);
            DayCalories {
                date: d.to_string(),
                calories: round_to(calories, 0),
                goal_percent: goal_percent(calories, goal),
            }
        })
        .collect();
    let average = days.iter().map(|d| d.calories).sum::<f64>() / days.len() as f64;

    WeeklySummary {
        end: end.to_string(),
        goal,
        days,
        average_calories: round_to(average, 0),
    }
}
