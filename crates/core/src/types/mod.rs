//! Core types for Pocket Cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;

pub use id::ProductId;
pub use line_item::{LineItem, NewLineItem};
