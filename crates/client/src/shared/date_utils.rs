//! Utilities for calendar-date handling
//!
//! All dates cross the wire as plain "YYYY-MM-DD" strings formatted from
//! `NaiveDate`. Conversion never goes through a UTC timestamp: a user east
//! of UTC picking "today" must not see yesterday's date in the request.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Inclusive calendar-date bounds for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Lower bound in wire format
    pub fn from_param(&self) -> String {
        to_api_date(self.from)
    }

    /// Upper bound in wire format
    pub fn to_param(&self) -> String {
        to_api_date(self.to)
    }
}

/// Format a calendar date for the backend
pub fn to_api_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Today as the LOCAL calendar date, not the UTC one
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// First and last day of the current local month (default report period)
pub fn current_month_range() -> DateRange {
    let today = local_today();
    month_range(today.year(), today.month()).unwrap_or(DateRange::new(today, today))
}

/// First and last day of the given month
pub fn month_range(year: i32, month: u32) -> Option<DateRange> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = last_day_of_month(year, month)?;
    Some(DateRange::new(start, end))
}

/// Last day of the month: first day of the next month minus one day
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1).map(|d| d - Duration::days(1))
}

/// Signed day count past the due date; negative while not yet due
pub fn days_overdue(due_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - due_date).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_api_date() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(to_api_date(date), "2025-03-07");
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2025, 12),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
        assert_eq!(
            last_day_of_month(2024, 2),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(
            last_day_of_month(2025, 2),
            NaiveDate::from_ymd_opt(2025, 2, 28)
        );
    }

    #[test]
    fn test_month_range_params() {
        let range = month_range(2025, 6).unwrap();
        assert_eq!(range.from_param(), "2025-06-01");
        assert_eq!(range.to_param(), "2025-06-30");
    }

    #[test]
    fn test_days_overdue() {
        let due = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let as_of = NaiveDate::from_ymd_opt(2025, 2, 9).unwrap();
        assert_eq!(days_overdue(due, as_of), 30);
        assert_eq!(days_overdue(as_of, due), -30);
        assert_eq!(days_overdue(due, due), 0);
    }
}
