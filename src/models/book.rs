//! Book (catalog entry) model

use serde::{Deserialize, Serialize};

/// A catalog title with the number of copies currently on the shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    quantity: i32,
}

impl Book {
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        quantity: i32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            quantity,
        }
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn is_available(&self) -> bool {
        self.quantity > 0
    }

    /// Set the shelf quantity. Negative values are refused and leave the
    /// current quantity untouched.
    pub fn set_quantity(&mut self, quantity: i32) -> bool {
        if quantity < 0 {
            tracing::warn!(isbn = %self.isbn, quantity, "Quantity cannot be negative");
            return false;
        }
        self.quantity = quantity;
        true
    }
}
