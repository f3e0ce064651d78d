//! Business logic services
//!
//! [`Library`] owns the repository and hands out short-lived service views
//! borrowing it. Every mutating operation validates against memory, mutates,
//! then flushes the touched collections before returning.

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod members;
pub mod stats;

use chrono::NaiveDate;
use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    config::{AppConfig, AuthConfig},
    models::LoanPolicy,
    repository::{CsvPersistence, Persistence, Repository},
};

pub use auth::{AuthService, Role, Session};
pub use catalog::CatalogService;
pub use loans::LoansService;
pub use members::MembersService;
pub use stats::{LibrarySummary, StatsService};

/// The library manager: sole owner of books, members and the loan ledger
pub struct Library {
    repository: Repository,
    policy: LoanPolicy,
    clock: Arc<dyn Clock>,
    auth: AuthConfig,
}

impl Library {
    pub fn new(
        persistence: Box<dyn Persistence>,
        policy: LoanPolicy,
        clock: Arc<dyn Clock>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            repository: Repository::load(persistence),
            policy,
            clock,
            auth,
        }
    }

    /// Flat files under the configured data directory, system clock
    pub fn open(config: &AppConfig) -> Self {
        tracing::info!(dir = %config.storage.data_dir.display(), "Opening library data");
        Self::new(
            Box::new(CsvPersistence::new(&config.storage)),
            LoanPolicy::from(&config.loans),
            Arc::new(SystemClock),
            config.auth.clone(),
        )
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn policy(&self) -> &LoanPolicy {
        &self.policy
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    pub fn catalog(&mut self) -> CatalogService<'_> {
        CatalogService::new(&mut self.repository)
    }

    pub fn members(&mut self) -> MembersService<'_> {
        MembersService::new(&mut self.repository)
    }

    pub fn loans(&mut self) -> LoansService<'_> {
        LoansService::new(&mut self.repository, self.policy, self.clock.as_ref())
    }

    pub fn stats(&self) -> StatsService<'_> {
        StatsService::new(&self.repository, self.clock.today())
    }

    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.repository, &self.auth)
    }
}
