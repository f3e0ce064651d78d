//! Library Manager
//!
//! Keeps a book catalog, a member registry and a loan ledger in memory,
//! writing every change through to flat CSV files. Fines accrue per day a
//! loan is returned after its due date.

pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use services::Library;
