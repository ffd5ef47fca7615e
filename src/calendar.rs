//! calendar-day arithmetic shared by schedule generation, discounting and
//! status derivation. All dates are civil dates without a time of day.

use chrono::{Duration, Months, NaiveDate};

use crate::errors::{LoanError, Result};

/// add `months` to `anchor`, clamping the day to the length of the target
/// month. Always computed from the anchor, never chained, so a loan granted
/// on Jan 31 falls due Feb 29 (leap year), Mar 31, Apr 30...
pub fn add_months_clamped(anchor: NaiveDate, months: u32) -> Result<NaiveDate> {
    anchor
        .checked_add_months(Months::new(months))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("date overflow adding {} months to {}", months, anchor),
        })
}

/// add whole days to a date
pub fn add_days(date: NaiveDate, days: u32) -> Result<NaiveDate> {
    date.checked_add_signed(Duration::days(days as i64))
        .ok_or_else(|| LoanError::CalculationError {
            message: format!("date overflow adding {} days to {}", days, date),
        })
}

/// whole days from `start` to `end`, counting both ends (`end - start + 1`)
pub fn days_between_inclusive(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    if end < start {
        return Err(LoanError::InvalidDateRange { start, end });
    }
    Ok((end - start).num_days() as u32 + 1)
}

/// whole days `date` is past `due`, zero when not yet due
pub fn days_past(due: NaiveDate, date: NaiveDate) -> u32 {
    if date <= due {
        0
    } else {
        (date - due).num_days() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let anchor = date(2024, 1, 31);
        assert_eq!(add_months_clamped(anchor, 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_months_clamped(anchor, 2).unwrap(), date(2024, 3, 31));
        assert_eq!(add_months_clamped(anchor, 3).unwrap(), date(2024, 4, 30));
        assert_eq!(add_months_clamped(anchor, 13).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_add_months_keeps_day() {
        let anchor = date(2024, 3, 15);
        assert_eq!(add_months_clamped(anchor, 12).unwrap(), date(2025, 3, 15));
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(date(2024, 2, 28), 1).unwrap(), date(2024, 2, 29));
        assert_eq!(add_days(date(2024, 12, 31), 1).unwrap(), date(2025, 1, 1));
    }

    #[test]
    fn test_days_between_inclusive() {
        assert_eq!(days_between_inclusive(date(2024, 1, 1), date(2024, 1, 31)).unwrap(), 31);
        assert_eq!(days_between_inclusive(date(2024, 1, 1), date(2024, 1, 1)).unwrap(), 1);
        assert!(matches!(
            days_between_inclusive(date(2024, 1, 2), date(2024, 1, 1)),
            Err(LoanError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_days_past() {
        let due = date(2024, 5, 10);
        assert_eq!(days_past(due, date(2024, 5, 1)), 0);
        assert_eq!(days_past(due, due), 0);
        assert_eq!(days_past(due, date(2024, 5, 25)), 15);
    }
}
