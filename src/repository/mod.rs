//! Repository layer: in-memory collections with write-through persistence

pub mod flat_file;
pub mod memory;
pub mod store;

pub use flat_file::CsvPersistence;
pub use memory::MemoryPersistence;
pub use store::{Record, Store};

use crate::{
    error::AppResult,
    models::{Book, Member, Transaction},
};

/// Load/save capability for the three collections. Every save receives the
/// full collection and replaces what was stored before.
#[cfg_attr(test, mockall::automock)]
pub trait Persistence: Send {
    fn load_books(&self) -> AppResult<Vec<Book>>;
    fn save_books(&self, books: &[Book]) -> AppResult<()>;

    fn load_members(&self) -> AppResult<Vec<Member>>;
    fn save_members(&self, members: &[Member]) -> AppResult<()>;

    fn load_transactions(&self) -> AppResult<Vec<Transaction>>;
    fn save_transactions(&self, transactions: &[Transaction]) -> AppResult<()>;
}

/// Owner of the book, member and transaction collections
pub struct Repository {
    books: Store<Book>,
    members: Store<Member>,
    transactions: Store<Transaction>,
    persistence: Box<dyn Persistence>,
}

impl Repository {
    /// Load every collection from `persistence`. A collection that cannot be
    /// loaded starts empty.
    pub fn load(persistence: Box<dyn Persistence>) -> Self {
        let books = loaded("books", persistence.load_books());
        let members = loaded("members", persistence.load_members());
        let transactions = loaded("transactions", persistence.load_transactions());

        tracing::info!(
            books = books.len(),
            members = members.len(),
            transactions = transactions.len(),
            "Library data loaded"
        );

        Self {
            books: Store::from_records(books),
            members: Store::from_records(members),
            transactions: Store::from_records(transactions),
            persistence,
        }
    }

    pub fn books(&self) -> &Store<Book> {
        &self.books
    }

    pub fn members(&self) -> &Store<Member> {
        &self.members
    }

    pub fn transactions(&self) -> &Store<Transaction> {
        &self.transactions
    }

    pub(crate) fn books_mut(&mut self) -> &mut Store<Book> {
        &mut self.books
    }

    pub(crate) fn members_mut(&mut self) -> &mut Store<Member> {
        &mut self.members
    }

    pub(crate) fn transactions_mut(&mut self) -> &mut Store<Transaction> {
        &mut self.transactions
    }

    // Write failures are logged; the in-memory state stays authoritative.

    pub(crate) fn flush_books(&self) {
        flushed("books", self.persistence.save_books(self.books.as_slice()));
    }

    pub(crate) fn flush_members(&self) {
        flushed("members", self.persistence.save_members(self.members.as_slice()));
    }

    pub(crate) fn flush_transactions(&self) {
        flushed(
            "transactions",
            self.persistence.save_transactions(self.transactions.as_slice()),
        );
    }
}

fn loaded<T>(collection: &str, result: AppResult<Vec<T>>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::error!(collection, error = %e, "Failed to load collection, starting empty");
        Vec::new()
    })
}

fn flushed(collection: &str, result: AppResult<()>) {
    if let Err(e) = result {
        tracing::error!(collection, error = %e, "Failed to save collection");
    }
}
