//! Error types for the library manager

use thiserror::Error;

/// Numeric error codes, stable across releases and used as CLI exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    StorageFailure = 3,
    NoSuchMember = 4,
    NoSuchBook = 5,
    NoSuchTransaction = 6,
    BookNotAvailable = 7,
    Duplicate = 8,
    AlreadyBorrowed = 9,
    AlreadyReturned = 10,
    BadValue = 11,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Book with ISBN {0} not found")]
    NoSuchBook(String),

    #[error("Member with id {0} not found")]
    NoSuchMember(String),

    #[error("Transaction {0} not found")]
    NoSuchTransaction(String),

    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("A member with id {0} is already registered")]
    DuplicateMemberId(String),

    #[error("Email {0} is already used by another member")]
    DuplicateEmail(String),

    #[error("\"{title}\" is out of stock")]
    OutOfStock { isbn: String, title: String },

    #[error("Member {member_id} already borrowed {isbn} and has not returned it")]
    AlreadyBorrowed { member_id: String, isbn: String },

    #[error("Transaction {0} was already returned")]
    AlreadyReturned(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NoSuchBook(_) => ErrorCode::NoSuchBook,
            AppError::NoSuchMember(_) => ErrorCode::NoSuchMember,
            AppError::NoSuchTransaction(_) => ErrorCode::NoSuchTransaction,
            AppError::DuplicateIsbn(_)
            | AppError::DuplicateMemberId(_)
            | AppError::DuplicateEmail(_) => ErrorCode::Duplicate,
            AppError::OutOfStock { .. } => ErrorCode::BookNotAvailable,
            AppError::AlreadyBorrowed { .. } => ErrorCode::AlreadyBorrowed,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::Authentication(_) => ErrorCode::NotAuthorized,
            AppError::Io(_) | AppError::Csv(_) => ErrorCode::StorageFailure,
            AppError::Malformed(_) => ErrorCode::BadValue,
            AppError::Config(_) => ErrorCode::Failure,
        }
    }

    /// True for rejections of a request by a business rule, as opposed to
    /// infrastructure faults.
    pub fn is_rejection(&self) -> bool {
        !matches!(
            self,
            AppError::Io(_) | AppError::Csv(_) | AppError::Malformed(_) | AppError::Config(_)
        )
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
