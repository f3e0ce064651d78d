//! Versioned in-memory collections

use crate::models::{eq_ignore_case, Book, Member, Transaction};

/// A record addressable by a unique key
pub trait Record: Clone {
    fn key(&self) -> &str;

    fn matches_key(&self, key: &str) -> bool {
        self.key() == key
    }
}

impl Record for Book {
    fn key(&self) -> &str {
        &self.isbn
    }
}

impl Record for Member {
    fn key(&self) -> &str {
        &self.id
    }

    fn matches_key(&self, key: &str) -> bool {
        eq_ignore_case(&self.id, key)
    }
}

impl Record for Transaction {
    fn key(&self) -> &str {
        &self.transaction_id
    }

    fn matches_key(&self, key: &str) -> bool {
        eq_ignore_case(&self.transaction_id, key)
    }
}

/// Insertion-ordered collection of records. `version` increases on every
/// mutation so callers can tell whether a snapshot is stale.
#[derive(Debug, Clone)]
pub struct Store<T> {
    records: Vec<T>,
    version: u64,
}

impl<T> Default for Store<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            version: 0,
        }
    }
}

impl<T: Record> Store<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<T>) -> Self {
        Self {
            records,
            version: 0,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.records.iter().find(|r| r.matches_key(key))
    }

    pub fn find<P>(&self, predicate: P) -> Option<&T>
    where
        P: Fn(&T) -> bool,
    {
        self.records.iter().find(|r| predicate(r))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    pub fn add(&mut self, record: T) {
        self.records.push(record);
        self.version += 1;
    }

    /// Apply `f` to the record with `key`. Returns `None` when absent.
    pub fn update<F, R>(&mut self, key: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let record = self.records.iter_mut().find(|r| r.matches_key(key))?;
        let result = f(record);
        self.version += 1;
        Some(result)
    }

    pub fn delete(&mut self, key: &str) -> Option<T> {
        let index = self.records.iter().position(|r| r.matches_key(key))?;
        self.version += 1;
        Some(self.records.remove(index))
    }

    /// Independent copy of every record
    pub fn list(&self) -> Vec<T> {
        self.records.clone()
    }
}
