//! Configuration management for the library manager

use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub books_file: String,
    pub members_file: String,
    pub transactions_file: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoansConfig {
    /// Days between borrow date and due date
    pub duration_days: i64,
    /// Fine charged per whole day late
    pub fine_per_day: i64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub admin_username: String,
    pub admin_password: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub loans: LoansConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LIBRARY__LOANS__FINE_PER_DAY=500
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("storage.data_dir", env::var("LIBRARY_DATA_DIR").ok())?
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.loans.validate()?;
        Ok(config)
    }
}

impl StorageConfig {
    pub fn books_path(&self) -> PathBuf {
        self.data_dir.join(&self.books_file)
    }

    pub fn members_path(&self) -> PathBuf {
        self.data_dir.join(&self.members_file)
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.transactions_file)
    }
}

/// Longest loan accepted from configuration, ten years
pub const MAX_LOAN_DAYS: i64 = 3650;

impl LoansConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOAN_DAYS).contains(&self.duration_days) {
            return Err(ConfigError::Message(format!(
                "loans.duration_days must be between 1 and {}, got {}",
                MAX_LOAN_DAYS, self.duration_days
            )));
        }
        if self.fine_per_day < 0 {
            return Err(ConfigError::Message(format!(
                "loans.fine_per_day must not be negative, got {}",
                self.fine_per_day
            )));
        }
        Ok(())
    }

    pub fn fine_per_day(&self) -> Decimal {
        Decimal::from(self.fine_per_day)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            books_file: "books.csv".to_string(),
            members_file: "members.csv".to_string(),
            transactions_file: "transactions.csv".to_string(),
        }
    }
}

impl Default for LoansConfig {
    fn default() -> Self {
        Self {
            duration_days: 7,
            fine_per_day: 1000,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            directory: None,
        }
    }
}
