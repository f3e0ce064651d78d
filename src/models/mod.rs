//! Data models for the library

pub mod book;
pub mod member;
pub mod stats;
pub mod transaction;

// Re-export commonly used types
pub use book::Book;
pub use member::Member;
pub use stats::{MonthlyStat, YearMonth};
pub use transaction::{calculate_fine, LoanDetails, LoanPolicy, Transaction, TransactionStatus};

/// Case-insensitive comparison used for member ids, emails and transaction ids
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}
