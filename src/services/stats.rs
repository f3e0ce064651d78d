//! Statistics service

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    models::{MonthlyStat, YearMonth},
    repository::Repository,
};

/// Headline counts for the whole library
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibrarySummary {
    pub total_titles: usize,
    pub copies_on_shelf: i64,
    pub total_members: usize,
    pub total_transactions: usize,
    pub open_loans: usize,
    pub overdue_loans: usize,
}

pub struct StatsService<'a> {
    repository: &'a Repository,
    today: NaiveDate,
}

impl<'a> StatsService<'a> {
    pub fn new(repository: &'a Repository, today: NaiveDate) -> Self {
        Self { repository, today }
    }

    /// Borrows per borrow month, returns and fines per return month,
    /// oldest month first. Months without activity are absent.
    pub fn monthly_statistics(&self) -> Vec<MonthlyStat> {
        let mut months: BTreeMap<YearMonth, MonthlyStat> = BTreeMap::new();

        for t in self.repository.transactions().iter() {
            let borrowed = YearMonth::from_date(t.borrow_date);
            months
                .entry(borrowed)
                .or_insert_with(|| MonthlyStat::new(borrowed))
                .total_borrows += 1;

            if !t.is_returned() {
                continue;
            }
            if let Some(return_date) = t.actual_return_date {
                let returned = YearMonth::from_date(return_date);
                let stat = months
                    .entry(returned)
                    .or_insert_with(|| MonthlyStat::new(returned));
                stat.total_returns += 1;
                if t.fine > Decimal::ZERO {
                    stat.total_fines += t.fine;
                }
            }
        }

        tracing::debug!(months = months.len(), "Computed monthly statistics");
        months.into_values().collect()
    }

    pub fn summary(&self) -> LibrarySummary {
        let transactions = self.repository.transactions();
        LibrarySummary {
            total_titles: self.repository.books().len(),
            copies_on_shelf: self
                .repository
                .books()
                .iter()
                .map(|b| i64::from(b.quantity()))
                .sum(),
            total_members: self.repository.members().len(),
            total_transactions: transactions.len(),
            open_loans: transactions.iter().filter(|t| t.is_open()).count(),
            overdue_loans: transactions
                .iter()
                .filter(|t| t.is_overdue(self.today))
                .count(),
        }
    }
}
