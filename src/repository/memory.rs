//! In-memory persistence, for tests and throwaway sessions

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Persistence;
use crate::{
    error::AppResult,
    models::{Book, Member, Transaction},
};

/// What the persistence currently holds, plus how often each collection
/// was saved
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub books: Vec<Book>,
    pub members: Vec<Member>,
    pub transactions: Vec<Transaction>,
    pub book_saves: usize,
    pub member_saves: usize,
    pub transaction_saves: usize,
}

/// Clones share the same backing snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryPersistence {
    inner: Arc<Mutex<Snapshot>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing collections
    pub fn seeded(books: Vec<Book>, members: Vec<Member>, transactions: Vec<Transaction>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Snapshot {
                books,
                members,
                transactions,
                ..Snapshot::default()
            })),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Persistence for MemoryPersistence {
    fn load_books(&self) -> AppResult<Vec<Book>> {
        Ok(self.lock().books.clone())
    }

    fn save_books(&self, books: &[Book]) -> AppResult<()> {
        let mut data = self.lock();
        data.books = books.to_vec();
        data.book_saves += 1;
        Ok(())
    }

    fn load_members(&self) -> AppResult<Vec<Member>> {
        Ok(self.lock().members.clone())
    }

    fn save_members(&self, members: &[Member]) -> AppResult<()> {
        let mut data = self.lock();
        data.members = members.to_vec();
        data.member_saves += 1;
        Ok(())
    }

    fn load_transactions(&self) -> AppResult<Vec<Transaction>> {
        Ok(self.lock().transactions.clone())
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> AppResult<()> {
        let mut data = self.lock();
        data.transactions = transactions.to_vec();
        data.transaction_saves += 1;
        Ok(())
    }
}
