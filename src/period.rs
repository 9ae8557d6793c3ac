//! Pay periods (calendar months) and inclusive date ranges.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Lowest accepted year.
pub const MIN_YEAR: i32 = 1900;
/// Highest accepted year.
pub const MAX_YEAR: i32 = 9999;

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `end < start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(AppError::validation(format!("date range ends before it starts: {start} > {end}")));
        }
        Ok(Self { start, end })
    }

    /// Whole calendar year.
    pub fn year(year: i32) -> Result<Self> {
        validate_year(year)?;
        let start = PayPeriod::new(year, 1)?.first_day();
        let end = PayPeriod::new(year, 12)?.last_day();
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// A payroll month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    /// Create a period, validating month and year bounds.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(AppError::invalid_period(format!("month must be 1-12, got {month}")));
        }
        Ok(Self { year, month })
    }

    /// Parse a month selector: "2024-05", "2024/5", "05-2024", "5.2024", "2024 05".
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input
            .trim()
            .split(['-', '/', ' ', '.'])
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(AppError::invalid_period(format!("expected YYYY-MM, got '{input}'")));
        }

        let (year, month) = if parts[0].len() == 4 {
            (parts[0], parts[1])
        } else {
            (parts[1], parts[0])
        };

        let year: i32 = year
            .parse()
            .map_err(|_| AppError::invalid_period(format!("invalid year in '{input}'")))?;
        let month: u32 = month
            .parse()
            .map_err(|_| AppError::invalid_period(format!("invalid month in '{input}'")))?;

        Self::new(year, month)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // Bounds are checked in `new`, so day 1 always exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let next_first = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next_first.and_then(|d| d.pred_opt()).unwrap_or(NaiveDate::MAX)
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.first_day(),
            end: self.last_day(),
        }
    }

    /// All twelve periods of a year.
    pub fn months_of(year: i32) -> Result<Vec<Self>> {
        (1..=12).map(|month| Self::new(year, month)).collect()
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Reject years outside the supported range.
pub fn validate_year(year: i32) -> Result<()> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::invalid_period(format!(
            "year must be {MIN_YEAR}-{MAX_YEAR}, got {year}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let expected = PayPeriod::new(2024, 5).unwrap();
        for input in ["2024-05", "2024/5", "05-2024", "5.2024", " 2024 05 "] {
            assert_eq!(PayPeriod::parse(input).unwrap(), expected, "input {input}");
        }
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(PayPeriod::parse("May"), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(PayPeriod::parse("2024-13"), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(PayPeriod::parse("2024-0"), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(PayPeriod::parse("20x4-05"), Err(AppError::InvalidPeriod(_))));
        assert!(matches!(PayPeriod::parse("2024-05-01"), Err(AppError::InvalidPeriod(_))));
    }

    #[test]
    fn test_year_bounds() {
        assert!(PayPeriod::new(1899, 1).is_err());
        assert!(PayPeriod::new(10_000, 1).is_err());
        assert!(PayPeriod::new(1900, 1).is_ok());
    }

    #[test]
    fn test_month_boundaries() {
        let feb = PayPeriod::new(2024, 2).unwrap();
        assert_eq!(feb.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let dec = PayPeriod::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn test_display_and_range() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap();
        let period = PayPeriod::new(2024, 3).unwrap();
        assert_eq!(period.to_string(), "2024-03");
        assert!(period.range().contains(date));
        assert!(!period.range().contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
    }

    #[test]
    fn test_year_range() {
        let range = DateRange::year(2024).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        assert_eq!(PayPeriod::months_of(2024).unwrap().len(), 12);
    }

    #[test]
    fn test_date_range_rejects_reversed() {
        let a = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(DateRange::new(a, b).is_err());
        assert!(DateRange::new(b, a).is_ok());
    }
}
