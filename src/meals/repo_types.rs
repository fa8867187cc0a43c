use std::{fmt, str::FromStr};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::Macros;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealKind {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    #[default]
    Meal,
}

impl MealKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MealKind::Breakfast => "breakfast",
            MealKind::Lunch => "lunch",
            MealKind::Dinner => "dinner",
            MealKind::Snack => "snack",
            MealKind::Meal => "meal",
        }
    }
}

impl FromStr for MealKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealKind::Breakfast),
            "lunch" => Ok(MealKind::Lunch),
            "dinner" => Ok(MealKind::Dinner),
            "snack" => Ok(MealKind::Snack),
            "meal" => Ok(MealKind::Meal),
            other => Err(anyhow!("unknown meal kind '{other}'")),
        }
    }
}

impl fmt::Display for MealKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an entry's numbers were obtained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealSource {
    Photo,
    Manual,
    Pantry,
}

impl MealSource {
    pub fn as_str(self) -> &'static str {
        match self {
            MealSource::Photo => "photo",
            MealSource::Manual => "manual",
            MealSource::Pantry => "pantry",
        }
    }
}

impl FromStr for MealSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(MealSource::Photo),
            "manual" => Ok(MealSource::Manual),
            "pantry" => Ok(MealSource::Pantry),
            other => Err(anyhow!("unknown meal source '{other}'")),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MealRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub kind: String,
    pub source: String,
    pub image_key: Option<String>,
    pub logged_at: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// Confirmed meal log entry.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MealEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub calories: f64,
    pub macros: Macros,
    pub kind: MealKind,
    pub source: MealSource,
    pub image_key: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub logged_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<MealRow> for MealEntry {
    type Error = anyhow::Error;

    fn try_from(r: MealRow) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: r.kind.parse()?,
            source: r.source.parse()?,
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            description: r.description,
            calories: r.calories,
            macros: Macros {
                protein_g: r.protein_g,
                carbs_g: r.carbs_g,
                fat_g: r.fat_g,
            },
            image_key: r.image_key,
            logged_at: r.logged_at,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> MealRow {
        MealRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Porridge".into(),
            description: None,
            calories: 320.0,
            protein_g: 11.0,
            carbs_g: 54.0,
            fat_g: 6.5,
            kind: "breakfast".into(),
            source: "manual".into(),
            image_key: None,
            logged_at: OffsetDateTime::UNIX_EPOCH,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn row_converts_to_entry() {
        let entry = MealEntry::try_from(row()).unwrap();
        assert_eq!(entry.kind, MealKind::Breakfast);
        assert_eq!(entry.source, MealSource::Manual);
        assert_eq!(entry.macros.fat_g, 6.5);
        assert!(entry.image_key.is_none());
    }

    #[test]
    fn unknown_kind_in_row_is_an_error() {
        let bad = MealRow { kind: "brunch".into(), ..row() };
        let err = MealEntry::try_from(bad).unwrap_err();
        assert!(err.to_string().contains("brunch"));
    }

    #[test]
    fn kind_defaults_to_meal() {
        assert_eq!(MealKind::default(), MealKind::Meal);
        let kind: MealKind = serde_json::from_str("\"snack\"").unwrap();
        assert_eq!(kind.as_str(), "snack");
    }
}
