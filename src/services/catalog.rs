//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::Book,
    repository::Repository,
};

pub struct CatalogService<'a> {
    repository: &'a mut Repository,
}

impl<'a> CatalogService<'a> {
    pub fn new(repository: &'a mut Repository) -> Self {
        Self { repository }
    }

    /// Add a book. Fails when the ISBN is already catalogued.
    pub fn add_book(&mut self, book: Book) -> AppResult<()> {
        if self.repository.books().contains(&book.isbn) {
            tracing::warn!(isbn = %book.isbn, "Book already exists");
            return Err(AppError::DuplicateIsbn(book.isbn));
        }

        tracing::info!(isbn = %book.isbn, title = %book.title, "Book added");
        self.repository.books_mut().add(book);
        self.repository.flush_books();
        Ok(())
    }

    pub fn find_by_isbn(&self, isbn: &str) -> Option<Book> {
        self.repository.books().get(isbn).cloned()
    }

    /// Overwrite title, author and quantity of the book with the same ISBN.
    /// A negative quantity is ignored, the other fields still change.
    pub fn update_book(&mut self, book: &Book) -> AppResult<()> {
        let updated = self.repository.books_mut().update(&book.isbn, |existing| {
            existing.title = book.title.clone();
            existing.author = book.author.clone();
            existing.set_quantity(book.quantity());
        });

        if updated.is_none() {
            tracing::warn!(isbn = %book.isbn, "Book not found for update");
            return Err(AppError::NoSuchBook(book.isbn.clone()));
        }

        tracing::info!(isbn = %book.isbn, "Book updated");
        self.repository.flush_books();
        Ok(())
    }

    pub fn delete_book(&mut self, isbn: &str) -> AppResult<Book> {
        let removed = self.repository.books_mut().delete(isbn).ok_or_else(|| {
            tracing::warn!(isbn, "Book not found for deletion");
            AppError::NoSuchBook(isbn.to_string())
        })?;

        tracing::info!(isbn, "Book deleted");
        self.repository.flush_books();
        Ok(removed)
    }

    /// Snapshot of the catalog
    pub fn list_books(&self) -> Vec<Book> {
        self.repository.books().list()
    }
}
