//! The consumer-facing cart handle.
//!
//! Consumers never construct a [`CartStore`] themselves; the composition
//! root opens one and attaches it to a [`CartHandle`], and clones of the
//! handle are passed to whatever needs cart access. A handle used before
//! attachment fails fast with [`StoreError::Detached`] rather than
//! pretending the cart is empty - misuse surfaces during development, not
//! as silently missing items.

use std::sync::{Arc, OnceLock};

use crate::error::{Result, StoreError};
use crate::store::CartStore;

/// A cloneable slot holding the application's [`CartStore`].
///
/// Starts detached; [`attach`](Self::attach) is called exactly once at
/// startup. All clones share the same slot, so attaching through one
/// clone makes the store visible to all of them.
#[derive(Clone, Default)]
pub struct CartHandle {
    slot: Arc<OnceLock<CartStore>>,
}

impl CartHandle {
    /// Create a detached handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the store. May succeed only once per slot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyAttached`] if a store is already
    /// attached.
    pub fn attach(&self, store: CartStore) -> Result<()> {
        self.slot
            .set(store)
            .map_err(|_| StoreError::AlreadyAttached)
    }

    /// Access the attached store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Detached`] if no store has been attached
    /// yet.
    pub fn store(&self) -> Result<&CartStore> {
        self.slot.get().ok_or(StoreError::Detached)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crate::snapshot::CART_KEY;
    use crate::storage::MemoryStorage;

    use super::*;

    async fn open_store() -> CartStore {
        CartStore::open(Arc::new(MemoryStorage::new()), CART_KEY).await
    }

    #[tokio::test]
    async fn test_detached_handle_fails_fast() {
        let handle = CartHandle::new();
        let err = handle.store().unwrap_err();
        assert!(matches!(err, StoreError::Detached));
    }

    #[tokio::test]
    async fn test_attach_makes_store_visible_to_all_clones() {
        let handle = CartHandle::new();
        let clone = handle.clone();

        handle.attach(open_store().await).unwrap();
        assert!(clone.store().is_ok());
    }

    #[tokio::test]
    async fn test_second_attach_is_rejected() {
        let handle = CartHandle::new();
        handle.attach(open_store().await).unwrap();

        let err = handle.attach(open_store().await).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyAttached));
    }
}
