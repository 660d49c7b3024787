//! Reporting periods.

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{ReportError, Result};

/// A half-open date range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    /// Creates a period. `to` must be after `from`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to <= from {
            return Err(ReportError::InvalidPeriod { from, to });
        }
        Ok(Self { from, to })
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let from = date.with_day(1).unwrap_or(date);
        let to = from
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date < self.to
    }

    /// Returns true if the instant falls on a day inside the period (UTC).
    pub fn contains_instant(&self, at: DateTime<Utc>) -> bool {
        self.contains(at.date_naive())
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} a {}",
            self.from.format("%d/%m/%Y"),
            self.to.format("%d/%m/%Y")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_is_half_open() {
        let period = Period::new(date(2024, 3, 1), date(2024, 4, 1)).unwrap();
        assert!(period.contains(date(2024, 3, 1)));
        assert!(period.contains(date(2024, 3, 31)));
        assert!(!period.contains(date(2024, 4, 1)));
    }

    #[test]
    fn test_empty_period_is_rejected() {
        assert!(matches!(
            Period::new(date(2024, 3, 1), date(2024, 3, 1)),
            Err(ReportError::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_month_of_december_rolls_over() {
        let period = Period::month_of(date(2024, 12, 17));
        assert_eq!(period.from, date(2024, 12, 1));
        assert_eq!(period.to, date(2025, 1, 1));
    }
}
