//! Monthly loan statistics

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Long label such as "May 2025"
    pub fn label(&self) -> String {
        match NaiveDate::from_ymd_opt(self.year, self.month, 1) {
            Some(first) => first.format("%B %Y").to_string(),
            None => "N/A".to_string(),
        }
    }
}

impl std::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Borrows, returns and fines attributed to one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyStat {
    pub month_year: YearMonth,
    pub total_borrows: u32,
    pub total_returns: u32,
    pub total_fines: Decimal,
}

impl MonthlyStat {
    pub fn new(month_year: YearMonth) -> Self {
        Self {
            month_year,
            total_borrows: 0,
            total_returns: 0,
            total_fines: Decimal::ZERO,
        }
    }
}
