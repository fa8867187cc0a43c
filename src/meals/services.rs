use thiserror::Error;
use uuid::Uuid;

use crate::{
    images::services::photo_key_prefix,
    inference::NutritionEstimate,
    meals::{
        dto::{DraftMealEntry, UpdateMealRequest},
        repo_types::{MealKind, MealSource},
    },
    nutrition::is_valid_amount,
};

pub const MANUAL_DESCRIPTION: &str = "Manually added meal";

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("meal name is required")]
    EmptyName,
    #[error("calories and macros must be non-negative numbers")]
    InvalidNumbers,
    #[error("photo does not belong to this user")]
    ForeignPhoto,
}

pub fn draft_from_estimate(
    estimate: NutritionEstimate,
    source: MealSource,
    kind: MealKind,
    image_key: Option<String>,
) -> DraftMealEntry {
    let description = estimate
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    let description = match (description, source) {
        (None, MealSource::Manual) => Some(MANUAL_DESCRIPTION.to_string()),
        (d, _) => d,
    };
    DraftMealEntry {
        name: estimate.food_name.trim().to_string(),
        description,
        calories: estimate.calories,
        macros: estimate.macros,
        kind,
        source,
        image_key,
    }
}

/// Checks a draft before it is logged for `user_id`.
pub fn validate_draft(user_id: Uuid, draft: DraftMealEntry) -> Result<DraftMealEntry, DraftError> {
    let name = draft.name.trim().to_string();
    if name.is_empty() {
        return Err(DraftError::EmptyName);
    }
    if !is_valid_amount(draft.calories) || !draft.macros.is_valid() {
        return Err(DraftError::InvalidNumbers);
    }
    if let Some(key) = &draft.image_key {
        if !key.starts_with(&photo_key_prefix(user_id)) || key.contains("..") {
            return Err(DraftError::ForeignPhoto);
        }
    }
    Ok(DraftMealEntry { name, ..draft })
}

pub fn validate_update(req: UpdateMealRequest) -> Result<UpdateMealRequest, DraftError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(DraftError::EmptyName);
    }
    if !is_valid_amount(req.calories) || !req.macros.is_valid() {
        return Err(DraftError::InvalidNumbers);
    }
    Ok(UpdateMealRequest { name, ..req })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Macros;

    fn estimate() -> NutritionEstimate {
        NutritionEstimate {
            food_name: " Apple ".into(),
            description: None,
            calories: 52.0,
            macros: Macros { protein_g: 0.3, carbs_g: 14.0, fat_g: 0.2 },
        }
    }

    #[test]
    fn manual_draft_gets_default_description() {
        let draft = draft_from_estimate(estimate(), MealSource::Manual, MealKind::Snack, None);
        assert_eq!(draft.name, "Apple");
        assert_eq!(draft.description.as_deref(), Some(MANUAL_DESCRIPTION));
        assert_eq!(draft.kind, MealKind::Snack);
    }

    #[test]
    fn photo_draft_keeps_missing_description() {
        let draft = draft_from_estimate(
            estimate(),
            MealSource::Photo,
            MealKind::Meal,
            Some("meals/x/y.jpg".into()),
        );
        assert!(draft.description.is_none());
        assert_eq!(draft.image_key.as_deref(), Some("meals/x/y.jpg"));
    }

    #[test]
    fn draft_validation() {
        let user = Uuid::new_v4();
        let draft = draft_from_estimate(estimate(), MealSource::Manual, MealKind::Meal, None);
        assert!(validate_draft(user, draft.clone()).is_ok());

        let blank = DraftMealEntry { name: "  ".into(), ..draft.clone() };
        assert_eq!(validate_draft(user, blank), Err(DraftError::EmptyName));

        let negative = DraftMealEntry { calories: -5.0, ..draft.clone() };
        assert_eq!(validate_draft(user, negative), Err(DraftError::InvalidNumbers));

        let own = DraftMealEntry {
            image_key: Some(format!("{}abc.jpg", photo_key_prefix(user))),
            ..draft.clone()
        };
        assert!(validate_draft(user, own).is_ok());

        let foreign = DraftMealEntry {
            image_key: Some(format!("{}abc.jpg", photo_key_prefix(Uuid::new_v4()))),
            ..draft
        };
        assert_eq!(validate_draft(user, foreign), Err(DraftError::ForeignPhoto));
    }
}
