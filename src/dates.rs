//! Calendar-day helpers. Days are UTC days.

use thiserror::Error;
use time::{macros::format_description, Date, Duration, OffsetDateTime, Time, UtcOffset};

#[derive(Debug, Error, PartialEq)]
pub enum DateError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Invalid(String),
    #[error("date {0} is outside the supported range")]
    OutOfRange(Date),
}

/// Parses `YYYY-MM-DD`, defaulting to today.
pub fn parse_day(raw: Option<&str>) -> Result<Date, DateError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(OffsetDateTime::now_utc().date()),
        Some(s) => Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map_err(|_| DateError::Invalid(s.to_string())),
    }
}

/// Half-open `[start, end)` instant range covering `day`.
pub fn day_bounds(day: Date) -> Result<(OffsetDateTime, OffsetDateTime), DateError> {
    window_bounds(day, 1)
}

/// Half-open instant range covering the `n` days ending at `end`.
/// Fails when the window starts before or ends after the representable range.
pub fn window_bounds(end: Date, n: u32) -> Result<(OffsetDateTime, OffsetDateTime), DateError> {
    let out_of_range = || DateError::OutOfRange(end);
    let last = end.with_time(Time::MIDNIGHT).assume_utc();
    let stop = last
        .checked_add(Duration::DAY)
        .ok_or_else(out_of_range)?;
    let start = stop
        .checked_sub(Duration::days(i64::from(n)))
        .ok_or_else(out_of_range)?;
    Ok((start, stop))
}

/// The `n` days ending at `end`, oldest first. Days before `Date::MIN` are
/// left out.
pub fn days_ending_at(end: Date, n: u32) -> Vec<Date> {
    (0..i64::from(n))
        .rev()
        .filter_map(|back| end.checked_sub(Duration::days(back)))
        .collect()
}

pub fn utc_day(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn parses_iso_days() {
        assert_eq!(parse_day(Some("2024-02-29")), Ok(date!(2024 - 02 - 29)));
        assert_eq!(
            parse_day(Some("29/02/2024")),
            Err(DateError::Invalid("29/02/2024".into()))
        );
        assert_eq!(parse_day(None), Ok(OffsetDateTime::now_utc().date()));
        assert_eq!(parse_day(Some("  ")), Ok(OffsetDateTime::now_utc().date()));
    }

    #[test]
    fn bounds_cover_one_day() {
        let (start, end) = day_bounds(date!(2024 - 03 - 10)).unwrap();
        assert_eq!(start, datetime!(2024-03-10 0:00 UTC));
        assert_eq!(end, datetime!(2024-03-11 0:00 UTC));
    }

    #[test]
    fn last_representable_day_has_no_bounds() {
        let day = parse_day(Some("9999-12-31")).unwrap();
        assert_eq!(day_bounds(day), Err(DateError::OutOfRange(day)));
        assert_eq!(window_bounds(day, 7), Err(DateError::OutOfRange(day)));

        let (start, end) = day_bounds(date!(9999 - 12 - 30)).unwrap();
        assert_eq!(start, datetime!(9999-12-30 0:00 UTC));
        assert_eq!(end, datetime!(9999-12-31 0:00 UTC));
    }

    #[test]
    fn week_window_near_the_start_of_the_range() {
        assert_eq!(
            window_bounds(Date::MIN, 7),
            Err(DateError::OutOfRange(Date::MIN))
        );
        let (start, end) = window_bounds(date!(2024 - 03 - 02), 7).unwrap();
        assert_eq!(start, datetime!(2024-02-25 0:00 UTC));
        assert_eq!(end, datetime!(2024-03-03 0:00 UTC));
    }

    #[test]
    fn week_is_cut_at_the_first_representable_day() {
        let days = days_ending_at(Date::MIN, 7);
        assert_eq!(days, vec![Date::MIN]);
    }

    #[test]
    fn week_is_oldest_first() {
        let days = days_ending_at(date!(2024 - 03 - 02), 7);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], date!(2024 - 02 - 25));
        assert_eq!(days[6], date!(2024 - 03 - 02));
    }

    #[test]
    fn utc_day_normalizes_offsets() {
        assert_eq!(utc_day(datetime!(2024-03-10 23:30 -2)), date!(2024 - 03 - 11));
    }
}
