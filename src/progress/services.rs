use thiserror::Error;

use crate::{
    nutrition::round_to,
    progress::{
        dto::{NewMeasurement, ProgressResponse},
        repo_types::BodyMeasurement,
    },
};

#[derive(Debug, Error, PartialEq)]
pub enum MeasurementError {
    #[error("weight must be > 0")]
    Weight,
    #[error("waist must be > 0")]
    Waist,
    #[error("body fat must be between 0 and 100 percent")]
    BodyFat,
}

fn positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

pub fn validate_measurement(m: &NewMeasurement) -> Result<(), MeasurementError> {
    if !positive(m.weight_kg) {
        return Err(MeasurementError::Weight);
    }
    if m.waist_cm.is_some_and(|w| !positive(w)) {
        return Err(MeasurementError::Waist);
    }
    if m.body_fat_pct.is_some_and(|p| !(positive(p) && p < 100.0)) {
        return Err(MeasurementError::BodyFat);
    }
    Ok(())
}

/// `entries` must be oldest first.
pub fn progress_overview(entries: Vec<BodyMeasurement>) -> ProgressResponse {
    let weight_change_kg = match (entries.first(), entries.last()) {
        (Some(first), Some(last)) if entries.len() >= 2 => {
            Some(round_to(last.weight_kg - first.weight_kg, 1))
        }
        _ => None,
    };
    ProgressResponse {
        latest: entries.last().cloned(),
        weight_change_kg,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    fn new(weight_kg: f64) -> NewMeasurement {
        NewMeasurement {
            weight_kg,
            waist_cm: None,
            body_fat_pct: None,
            logged_at: None,
        }
    }

    fn entry(weight_kg: f64, day: i64) -> BodyMeasurement {
        BodyMeasurement {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            weight_kg,
            waist_cm: None,
            body_fat_pct: None,
            logged_at: OffsetDateTime::UNIX_EPOCH + Duration::days(day),
        }
    }

    #[test]
    fn measurement_validation() {
        assert!(validate_measurement(&new(72.4)).is_ok());
        assert_eq!(validate_measurement(&new(0.0)), Err(MeasurementError::Weight));
        assert_eq!(
            validate_measurement(&NewMeasurement { waist_cm: Some(-3.0), ..new(70.0) }),
            Err(MeasurementError::Waist)
        );
        assert_eq!(
            validate_measurement(&NewMeasurement { body_fat_pct: Some(100.0), ..new(70.0) }),
            Err(MeasurementError::BodyFat)
        );
        assert!(validate_measurement(&NewMeasurement { body_fat_pct: Some(18.5), ..new(70.0) }).is_ok());
    }

    #[test]
    fn overview_reports_change_from_first_to_latest() {
        let overview = progress_overview(vec![entry(80.0, 0), entry(78.6, 7), entry(77.3, 14)]);
        assert_eq!(overview.weight_change_kg, Some(-2.7));
        assert_eq!(overview.latest.unwrap().weight_kg, 77.3);
        assert_eq!(overview.entries.len(), 3);
    }

    #[test]
    fn single_entry_has_no_change() {
        let overview = progress_overview(vec![entry(80.0, 0)]);
        assert_eq!(overview.weight_change_kg, None);
        assert!(overview.latest.is_some());
        assert!(progress_overview(Vec::new()).latest.is_none());
    }
}
