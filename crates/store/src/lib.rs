//! Pocket Cart Store - persistent cart state container.
//!
//! This crate owns everything between the pure cart state machine in
//! `pocket-cart-core` and the device's key-value storage:
//!
//! - [`storage`] - The `KeyValueStorage` trait with in-memory and
//!   file-backed implementations
//! - [`snapshot`] - The JSON snapshot codec with explicit
//!   absent / malformed / valid decoding
//! - [`store`] - [`CartStore`], the async store that applies mutations
//!   in-memory and mirrors every committed state to storage
//! - [`handle`] - [`CartHandle`], the injection point consumers receive
//! - [`error`] - Error types for the storage and store boundaries
//!
//! # Persistence timing
//!
//! Mutations commit in-memory and return immediately; a writer task
//! observes committed state and serializes what it sees, so the persisted
//! payload is always derived from the post-transition state. Callers that
//! need durability (process shutdown, tests) await [`CartStore::flush`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod error;
pub mod handle;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use error::{StorageError, StoreError};
pub use handle::CartHandle;
pub use snapshot::{CART_KEY, Snapshot};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::CartStore;
