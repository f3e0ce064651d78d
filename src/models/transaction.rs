//! Loan transaction model and the late-fine law

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LoansConfig;

/// Loan state. `Borrowed -> Returned` is the only transition the ledger
/// performs; `Overdue` is derived when reading (see
/// [`Transaction::effective_status`]) and accepted from older data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Borrowed,
    Returned,
    Overdue,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Borrowed => "Borrowed",
            TransactionStatus::Returned => "Returned",
            TransactionStatus::Overdue => "Overdue",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "borrowed" => Ok(TransactionStatus::Borrowed),
            "returned" => Ok(TransactionStatus::Returned),
            "overdue" => Ok(TransactionStatus::Overdue),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

/// Loan duration and daily fine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanPolicy {
    pub duration_days: i64,
    pub fine_per_day: Decimal,
}

impl Default for LoanPolicy {
    fn default() -> Self {
        Self {
            duration_days: 7,
            fine_per_day: Decimal::from(1000),
        }
    }
}

impl LoanPolicy {
    /// `borrow_date` plus the loan duration. Negative durations count as zero
    /// and dates past the calendar's end saturate.
    pub fn due_date(&self, borrow_date: NaiveDate) -> NaiveDate {
        Duration::try_days(self.duration_days.max(0))
            .and_then(|days| borrow_date.checked_add_signed(days))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl From<&LoansConfig> for LoanPolicy {
    fn from(config: &LoansConfig) -> Self {
        Self {
            duration_days: config.duration_days,
            fine_per_day: config.fine_per_day(),
        }
    }
}

/// Fine for returning on `return_date` a loan due on `due_date`: one
/// `fine_per_day` per whole day strictly after the due date, never negative.
pub fn calculate_fine(due_date: NaiveDate, return_date: NaiveDate, fine_per_day: Decimal) -> Decimal {
    if return_date <= due_date || fine_per_day <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    Decimal::from((return_date - due_date).num_days())
        .checked_mul(fine_per_day)
        .unwrap_or(Decimal::MAX)
}

/// One member borrowing one copy of one book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub member_id: String,
    pub isbn: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub actual_return_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub fine: Decimal,
}

impl Transaction {
    /// Open a new loan starting on `borrow_date`
    pub fn new(
        transaction_id: impl Into<String>,
        member_id: impl Into<String>,
        isbn: impl Into<String>,
        borrow_date: NaiveDate,
        policy: &LoanPolicy,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            member_id: member_id.into(),
            isbn: isbn.into(),
            borrow_date,
            due_date: policy.due_date(borrow_date),
            actual_return_date: None,
            status: TransactionStatus::Borrowed,
            fine: Decimal::ZERO,
        }
    }

    /// Borrowed or Overdue
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Borrowed | TransactionStatus::Overdue
        )
    }

    pub fn is_returned(&self) -> bool {
        self.status == TransactionStatus::Returned
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && today > self.due_date
    }

    /// Status as it should be displayed on `today`
    pub fn effective_status(&self, today: NaiveDate) -> TransactionStatus {
        if self.is_overdue(today) {
            TransactionStatus::Overdue
        } else {
            self.status
        }
    }

    /// Recorded fine once returned, otherwise what a return on `today`
    /// would cost. Never mutates the loan.
    pub fn fine_as_of(&self, today: NaiveDate, policy: &LoanPolicy) -> Decimal {
        if self.is_returned() {
            return self.fine;
        }
        calculate_fine(self.due_date, today, policy.fine_per_day)
    }

    /// Close the loan on `return_date` and record the fine
    pub(crate) fn mark_returned(&mut self, return_date: NaiveDate, policy: &LoanPolicy) -> Decimal {
        self.actual_return_date = Some(return_date);
        self.status = TransactionStatus::Returned;
        self.fine = calculate_fine(self.due_date, return_date, policy.fine_per_day);
        self.fine
    }
}

/// Loan with member and book context for reports
#[derive(Debug, Clone, Serialize)]
pub struct LoanDetails {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub member_name: Option<String>,
    pub book_title: Option<String>,
    pub current_status: TransactionStatus,
    pub is_overdue: bool,
    pub fine_due: Decimal,
}
