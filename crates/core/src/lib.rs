//! Pocket Cart Core - Cart domain types and state machine.
//!
//! This crate provides the types shared across all Pocket Cart components:
//! - `store` - Persistent cart store and storage backends
//! - `cli` - Command-line frontend
//!
//! # Architecture
//!
//! The core crate contains only types and pure state transitions - no I/O,
//! no storage access, no async. This keeps it lightweight and allows it to
//! be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers and cart line items
//! - [`cart`] - The ordered cart collection and its transitions

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartValidationError};
pub use types::*;
