//! Cart snapshot codec.
//!
//! A snapshot is the cart serialized as a JSON array of line items with
//! the fields `id`, `title`, `image_url`, `price`, `quantity`, stored
//! under the key [`CART_KEY`].
//!
//! Decoding is an explicit tri-state: absent, malformed, or valid. A
//! stored value that fails to parse, or parses into data that violates
//! the cart invariants (duplicate ids, zero quantities), is [`Malformed`]
//! and gets the same treatment as absent at the store layer - the cart
//! starts empty instead of propagating a parse failure.
//!
//! [`Malformed`]: Snapshot::Malformed

use pocket_cart_core::{Cart, LineItem};

/// Storage key for the cart snapshot.
pub const CART_KEY: &str = "cart";

/// Result of decoding a stored cart snapshot.
#[derive(Debug)]
pub enum Snapshot {
    /// No snapshot is stored.
    Absent,
    /// A snapshot is stored but cannot be used.
    Malformed {
        /// What was wrong with it, for the log.
        reason: String,
    },
    /// A usable snapshot.
    Valid(Cart),
}

/// Serialize the cart to its snapshot representation.
///
/// # Errors
///
/// Returns `serde_json::Error` if serialization fails; with these types
/// that indicates a bug rather than bad data.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(cart)
}

/// Decode a raw stored value into a [`Snapshot`].
#[must_use]
pub fn decode(raw: Option<&str>) -> Snapshot {
    let Some(raw) = raw else {
        return Snapshot::Absent;
    };

    let lines: Vec<LineItem> = match serde_json::from_str(raw) {
        Ok(lines) => lines,
        Err(err) => {
            return Snapshot::Malformed {
                reason: format!("snapshot is not a line-item array: {err}"),
            };
        }
    };

    match Cart::from_lines(lines) {
        Ok(cart) => Snapshot::Valid(cart),
        Err(err) => Snapshot::Malformed {
            reason: format!("snapshot violates cart invariants: {err}"),
        },
    }
}
