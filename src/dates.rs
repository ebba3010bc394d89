//! # Dates
//!
//! Age and calendar helpers shared by the registration flow, the roster
//! filters and the exports.
//!
//! ## Rules
//!
//! - Age is the floor of the fractional-year difference between the reference
//!   date and the birth date. It is computed once at write time and stored on
//!   the participant document, never recomputed on read.
//! - A participant is a minor when `age < 18`. The same rule drives the
//!   consent dialog on sign-up, the minor/adult roster filter and the export
//!   labeling.
//! - All dates shown to users are rendered `dd/mm/yyyy`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::error::AppError;

pub const ADULT_AGE: u32 = 18;

/// Whole years between `birth` and `as_of`, not counting a birthday that has
/// not happened yet.
pub fn compute_age(birth: NaiveDate, as_of: NaiveDate) -> Result<u32, AppError> {
    if birth > as_of {
        return Err(AppError::InvalidDate);
    }

    let mut age = as_of.year() - birth.year();
    if (as_of.month(), as_of.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    Ok(age as u32)
}

pub fn is_minor(age: u32) -> bool {
    age < ADULT_AGE
}

pub fn format_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_br_datetime(timestamp: DateTime<Utc>) -> String {
    format_br(timestamp.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_after_birthday() {
        assert_eq!(compute_age(date(2000, 1, 1), date(2024, 1, 1)).unwrap(), 24);
    }

    #[test]
    fn test_age_before_birthday() {
        assert_eq!(compute_age(date(2000, 1, 1), date(2023, 12, 31)).unwrap(), 23);
    }

    #[test]
    fn test_age_same_day() {
        assert_eq!(compute_age(date(2024, 5, 10), date(2024, 5, 10)).unwrap(), 0);
    }

    #[test]
    fn test_age_rejects_future_birth() {
        let result = compute_age(date(2030, 1, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(AppError::InvalidDate)));
    }

    #[test]
    fn test_minor_boundary() {
        assert!(is_minor(17));
        assert!(!is_minor(18));
    }

    #[test]
    fn test_format_br() {
        assert_eq!(format_br(date(2025, 2, 6)), "06/02/2025");
    }
}
