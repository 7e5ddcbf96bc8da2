//! The cart collection and its transitions.
//!
//! A [`Cart`] is an ordered sequence of [`LineItem`]s keyed by product id.
//! Insertion order is preserved across additions; it carries no other
//! meaning.
//!
//! ## Invariants
//!
//! - Every line has `quantity >= 1`; decrementing to 0 removes the line.
//! - Product ids are unique within the cart; adding an existing id
//!   increments its quantity instead of appending a duplicate.
//!
//! All transitions are pure and infallible. Operations referencing an
//! unknown id are silent no-ops - the UI may hold stale references and
//! must not blow up on them.

use serde::{Deserialize, Serialize};

use crate::types::{LineItem, NewLineItem, ProductId};

/// Errors found when validating externally-supplied cart data.
///
/// Transitions never produce these; they only arise when reconstructing a
/// cart from untrusted input such as a persisted snapshot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CartValidationError {
    /// Two lines share the same product id.
    #[error("duplicate product id in cart: {0}")]
    DuplicateId(ProductId),
    /// A line has quantity 0, which must not exist in a cart.
    #[error("line item {0} has quantity 0")]
    ZeroQuantity(ProductId),
}

/// An ordered collection of cart line items, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Reconstruct a cart from externally-supplied lines, enforcing the
    /// cart invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CartValidationError`] if any id is duplicated or any line
    /// has quantity 0.
    pub fn from_lines(lines: Vec<LineItem>) -> Result<Self, CartValidationError> {
        for (i, line) in lines.iter().enumerate() {
            if line.quantity == 0 {
                return Err(CartValidationError::ZeroQuantity(line.id.clone()));
            }
            if lines.iter().take(i).any(|other| other.id == line.id) {
                return Err(CartValidationError::DuplicateId(line.id.clone()));
            }
        }
        Ok(Self { lines })
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> rust_decimal::Decimal {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Add a product to the cart.
    ///
    /// If a line with the same id already exists, its quantity grows by 1
    /// and the descriptor's title/price/image are ignored (repeat-add
    /// accumulates quantity, it does not refresh catalog data). Otherwise
    /// the product is appended with quantity 1.
    pub fn add(&mut self, item: NewLineItem) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.id == item.id) {
            line.quantity += 1;
        } else {
            self.lines.push(item.into_line_item());
        }
    }

    /// Increase the quantity of the line with the given id by 1.
    ///
    /// Unknown ids are a silent no-op. Returns whether a line matched, so
    /// callers can skip change notification on no-ops; a no-op is never an
    /// error.
    pub fn increment(&mut self, id: &ProductId) -> bool {
        if let Some(line) = self.lines.iter_mut().find(|line| &line.id == id) {
            line.quantity += 1;
            true
        } else {
            false
        }
    }

    /// Decrease the quantity of the line with the given id by 1, removing
    /// the line entirely when it reaches 0.
    ///
    /// Unknown ids are a silent no-op. Returns whether a line matched.
    pub fn decrement(&mut self, id: &ProductId) -> bool {
        if let Some(pos) = self.lines.iter().position(|line| &line.id == id) {
            if let Some(line) = self.lines.get_mut(pos) {
                line.quantity -= 1;
                if line.quantity == 0 {
                    self.lines.remove(pos);
                }
            }
            true
        } else {
            false
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
