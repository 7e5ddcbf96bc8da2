//! Cart line items.
//!
//! A [`LineItem`] is one product entry in the cart with an associated
//! quantity. A [`NewLineItem`] is the descriptor a caller supplies when
//! adding a product - everything but the quantity, which the cart owns.
//!
//! Serialized field names (`id`, `title`, `image_url`, `price`, `quantity`)
//! are the persistence format and must stay stable across releases.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ProductId;

/// One product entry in the cart.
///
/// Invariant: a `LineItem` inside a cart always has `quantity >= 1`. A
/// line that would reach quantity 0 is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Catalog identifier, unique within a cart.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display asset reference.
    pub image_url: String,
    /// Unit price.
    pub price: Decimal,
    /// Number of units, always >= 1 inside a cart.
    pub quantity: u32,
}

impl LineItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Descriptor for a product being added to the cart.
///
/// Carries everything a [`LineItem`] has except the quantity; the cart
/// assigns quantity 1 on first add and increments on repeat adds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub title: String,
    /// Display asset reference.
    pub image_url: String,
    /// Unit price.
    pub price: Decimal,
}

impl NewLineItem {
    /// Turn the descriptor into a line item with an initial quantity of 1.
    #[must_use]
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            title: self.title,
            image_url: self.image_url,
            price: self.price,
            quantity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: "Mango".to_owned(),
            image_url: "https://img.example/mango.png".to_owned(),
            price: Decimal::new(1050, 2),
        }
    }

    #[test]
    fn test_into_line_item_starts_at_quantity_one() {
        let line = descriptor("p1").into_line_item();
        assert_eq!(line.quantity, 1);
        assert_eq!(line.id, ProductId::new("p1"));
        assert_eq!(line.title, "Mango");
    }

    #[test]
    fn test_line_total() {
        let mut line = descriptor("p1").into_line_item();
        line.quantity = 3;
        assert_eq!(line.line_total(), Decimal::new(3150, 2));
    }

    #[test]
    fn test_serde_field_names() {
        let line = descriptor("p1").into_line_item();
        let value = serde_json::to_value(&line).unwrap();
        let obj = value.as_object().unwrap();
        for field in ["id", "title", "image_url", "price", "quantity"] {
            assert!(obj.contains_key(field), "missing field {field}");
        }
    }
}
