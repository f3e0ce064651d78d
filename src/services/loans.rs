//! Loan management service

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{LoanDetails, LoanPolicy, Transaction},
    repository::Repository,
};

pub struct LoansService<'a> {
    repository: &'a mut Repository,
    policy: LoanPolicy,
    clock: &'a dyn Clock,
}

impl<'a> LoansService<'a> {
    pub fn new(repository: &'a mut Repository, policy: LoanPolicy, clock: &'a dyn Clock) -> Self {
        Self {
            repository,
            policy,
            clock,
        }
    }

    /// Lend one copy of `isbn` to `member_id`, due `duration_days` from today.
    ///
    /// Rejected when the member or book is unknown, no copy is on the shelf,
    /// or the member still holds an unreturned copy of the same book.
    pub fn borrow_book(&mut self, member_id: &str, isbn: &str) -> AppResult<Transaction> {
        let member = self
            .repository
            .members()
            .get(member_id)
            .ok_or_else(|| rejected(AppError::NoSuchMember(member_id.to_string())))?;

        let book = self
            .repository
            .books()
            .get(isbn)
            .ok_or_else(|| rejected(AppError::NoSuchBook(isbn.to_string())))?;

        if !book.is_available() {
            return Err(rejected(AppError::OutOfStock {
                isbn: book.isbn.clone(),
                title: book.title.clone(),
            }));
        }

        let already_open = self
            .repository
            .transactions()
            .iter()
            .any(|t| member.has_id(&t.member_id) && t.isbn == book.isbn && t.is_open());
        if already_open {
            return Err(rejected(AppError::AlreadyBorrowed {
                member_id: member.id.clone(),
                isbn: book.isbn.clone(),
            }));
        }

        let transaction = Transaction::new(
            self.generate_transaction_id(),
            member.id.clone(),
            book.isbn.clone(),
            self.clock.today(),
            &self.policy,
        );
        tracing::info!(
            transaction_id = %transaction.transaction_id,
            member_id = %member.id,
            member = %member.full_name,
            title = %book.title,
            due_date = %transaction.due_date,
            "Book borrowed"
        );

        self.repository.transactions_mut().add(transaction.clone());
        self.repository
            .books_mut()
            .update(&transaction.isbn, |b| b.set_quantity(b.quantity() - 1));

        self.repository.flush_transactions();
        self.repository.flush_books();
        Ok(transaction)
    }

    /// Close an open loan today, put the copy back on the shelf and record
    /// the late fine. A loan whose book left the catalog is still closed.
    pub fn return_book(&mut self, transaction_id: &str) -> AppResult<Transaction> {
        let (id, isbn) = match self.repository.transactions().get(transaction_id) {
            None => return Err(rejected(AppError::NoSuchTransaction(transaction_id.to_string()))),
            Some(t) if t.is_returned() => {
                tracing::info!(transaction_id = %t.transaction_id, "Book was already returned");
                return Err(AppError::AlreadyReturned(t.transaction_id.clone()));
            }
            Some(t) => (t.transaction_id.clone(), t.isbn.clone()),
        };

        let restock = self.repository.books_mut().update(&isbn, |b| {
            b.quantity()
                .checked_add(1)
                .is_some_and(|quantity| b.set_quantity(quantity))
        });
        let restocked = match restock {
            Some(true) => true,
            Some(false) => {
                tracing::warn!(
                    transaction_id = %id,
                    isbn = %isbn,
                    "Book quantity is at its maximum, quantity not updated"
                );
                false
            }
            None => {
                tracing::warn!(
                    transaction_id = %id,
                    isbn = %isbn,
                    "Returned book is no longer in the catalog, quantity not updated"
                );
                false
            }
        };

        let today = self.clock.today();
        let policy = self.policy;
        let returned = self
            .repository
            .transactions_mut()
            .update(&id, |t| {
                t.mark_returned(today, &policy);
                t.clone()
            })
            .ok_or_else(|| AppError::NoSuchTransaction(id.clone()))?;

        self.repository.flush_transactions();
        if restocked {
            self.repository.flush_books();
        }

        if returned.fine > Decimal::ZERO {
            tracing::info!(transaction_id = %id, fine = %returned.fine, "Book returned late");
        } else {
            tracing::info!(transaction_id = %id, "Book returned");
        }
        Ok(returned)
    }

    pub fn find_by_id(&self, transaction_id: &str) -> Option<Transaction> {
        self.repository.transactions().get(transaction_id).cloned()
    }

    /// Snapshot of the whole ledger
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.repository.transactions().list()
    }

    /// Loans with status Borrowed or Overdue
    pub fn open_loans(&self) -> Vec<Transaction> {
        self.repository
            .transactions()
            .iter()
            .filter(|t| t.is_open())
            .cloned()
            .collect()
    }

    /// Loans of `member_id`, most recent borrow first
    pub fn loans_for_member(&self, member_id: &str) -> Vec<Transaction> {
        if member_id.trim().is_empty() {
            return Vec::new();
        }
        let mut loans: Vec<Transaction> = self
            .repository
            .transactions()
            .iter()
            .filter(|t| t.member_id == member_id)
            .cloned()
            .collect();
        loans.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));
        loans
    }

    /// Fine owed if the loan were returned today; the recorded fine once
    /// returned
    pub fn preview_fine(&self, transaction_id: &str) -> AppResult<Decimal> {
        self.repository
            .transactions()
            .get(transaction_id)
            .map(|t| t.fine_as_of(self.clock.today(), &self.policy))
            .ok_or_else(|| AppError::NoSuchTransaction(transaction_id.to_string()))
    }

    /// Open loans with member names, book titles and fines as of today
    pub fn borrowed_books_report(&self) -> Vec<LoanDetails> {
        self.open_loans().into_iter().map(|t| self.details(t)).collect()
    }

    pub fn member_loan_details(&self, member_id: &str) -> Vec<LoanDetails> {
        self.loans_for_member(member_id)
            .into_iter()
            .map(|t| self.details(t))
            .collect()
    }

    fn details(&self, transaction: Transaction) -> LoanDetails {
        let today = self.clock.today();
        let member_name = self
            .repository
            .members()
            .get(&transaction.member_id)
            .map(|m| m.full_name.clone());
        let book_title = self
            .repository
            .books()
            .get(&transaction.isbn)
            .map(|b| b.title.clone());

        LoanDetails {
            member_name,
            book_title,
            current_status: transaction.effective_status(today),
            is_overdue: transaction.is_overdue(today),
            fine_due: transaction.fine_as_of(today, &self.policy),
            transaction,
        }
    }

    /// `T-` followed by eight upper-case hex digits, unique in the ledger
    fn generate_transaction_id(&self) -> String {
        loop {
            let uuid = Uuid::new_v4().simple().to_string();
            let id = format!("T-{}", uuid[..8].to_uppercase());
            if !self.repository.transactions().contains(&id) {
                return id;
            }
        }
    }
}

fn rejected(error: AppError) -> AppError {
    tracing::warn!(error = %error, "Loan request rejected");
    error
}
