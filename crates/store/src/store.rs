//! The persistent cart store.
//!
//! [`CartStore`] owns the in-memory cart and keeps storage converging to
//! it. Mutations apply the pure transition from `pocket-cart-core`,
//! publish the committed state, and return without touching storage; a
//! writer task observes committed state and persists what it sees.
//!
//! Because the writer serializes the state it receives *after* the
//! transition committed, the persisted payload can never lag behind the
//! operation that triggered it. When mutations arrive faster than the
//! backend writes, intermediate states are skipped and only the latest is
//! written.
//!
//! An empty cart is persisted by removing the stored key - absence and
//! emptiness are the same state on disk.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use pocket_cart_core::{Cart, LineItem, NewLineItem, ProductId};

use crate::error::{Result, StoreError};
use crate::snapshot::{self, Snapshot};
use crate::storage::KeyValueStorage;

/// The committed in-memory state plus a sequence number the writer and
/// `flush` use to agree on what has been made durable.
#[derive(Debug, Clone)]
struct Committed {
    seq: u64,
    cart: Cart,
}

/// What the writer last persisted.
#[derive(Debug, Clone)]
struct Persisted {
    seq: u64,
    /// Error message from the most recent write attempt, if it failed.
    /// In-memory state is unaffected; storage is stale until a later
    /// write succeeds.
    error: Option<String>,
}

struct Inner {
    committed_tx: watch::Sender<Committed>,
    persisted_rx: watch::Receiver<Persisted>,
    view_tx: watch::Sender<Cart>,
    writer: JoinHandle<()>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.writer.abort();
    }
}

/// A cart state container mirrored to a key-value storage backend.
///
/// Cheaply cloneable; clones share the same state and writer task.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.committed_tx.borrow();
        f.debug_struct("CartStore")
            .field("seq", &state.seq)
            .field("lines", &state.cart.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open a store over `storage`, loading any snapshot stored under
    /// `key`.
    ///
    /// A missing snapshot starts the cart empty. A malformed snapshot or
    /// a failed read is logged and treated the same way - the cart never
    /// refuses to open over bad storage, it degrades to empty.
    pub async fn open(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        let key = key.into();

        let raw = match storage.get(&key).await {
            Ok(raw) => raw,
            Err(err) => {
                error!(%key, %err, "failed to read cart snapshot; starting empty");
                None
            }
        };

        let cart = match snapshot::decode(raw.as_deref()) {
            Snapshot::Valid(cart) => {
                debug!(%key, lines = cart.len(), "loaded cart snapshot");
                cart
            }
            Snapshot::Absent => Cart::new(),
            Snapshot::Malformed { reason } => {
                warn!(%key, %reason, "discarding malformed cart snapshot");
                Cart::new()
            }
        };

        let (committed_tx, committed_rx) = watch::channel(Committed { seq: 0, cart: cart.clone() });
        let (persisted_tx, persisted_rx) = watch::channel(Persisted { seq: 0, error: None });
        let (view_tx, _) = watch::channel(cart);

        let writer = tokio::spawn(run_writer(storage, key, committed_rx, persisted_tx));

        Self {
            inner: Arc::new(Inner {
                committed_tx,
                persisted_rx,
                view_tx,
                writer,
            }),
        }
    }

    /// Current cart lines in insertion order.
    #[must_use]
    pub fn products(&self) -> Vec<LineItem> {
        self.inner.committed_tx.borrow().cart.lines().to_vec()
    }

    /// A clone of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.committed_tx.borrow().cart.clone()
    }

    /// Subscribe to committed cart states.
    ///
    /// The receiver wakes only when the cart actually changes; no-op
    /// operations (unknown ids) do not notify.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.view_tx.subscribe()
    }

    /// Add a product to the cart: a new line with quantity 1, or +1 on
    /// the existing line for that id.
    pub fn add_to_cart(&self, item: NewLineItem) {
        let id = item.id.clone();
        self.commit("add_to_cart", &id, |cart| {
            cart.add(item);
            true
        });
    }

    /// Increase the quantity of the line with this id by 1. Unknown ids
    /// are a silent no-op.
    pub fn increment(&self, id: &ProductId) {
        self.commit("increment", id, |cart| cart.increment(id));
    }

    /// Decrease the quantity of the line with this id by 1, removing the
    /// line when it reaches 0. Unknown ids are a silent no-op.
    pub fn decrement(&self, id: &ProductId) {
        self.commit("decrement", id, |cart| cart.decrement(id));
    }

    /// Empty the cart. The stored key is removed by the writer.
    pub fn clear(&self) {
        let changed = self.inner.committed_tx.send_if_modified(|state| {
            if state.cart.is_empty() {
                false
            } else {
                state.cart.clear();
                state.seq += 1;
                true
            }
        });
        if changed {
            self.publish_view("clear", None);
        }
    }

    /// Wait until everything committed before this call is durable.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the latest write attempt
    /// failed, or [`StoreError::WriterGone`] if the writer task stopped.
    pub async fn flush(&self) -> Result<()> {
        let target = self.inner.committed_tx.borrow().seq;
        let mut persisted_rx = self.inner.persisted_rx.clone();

        let persisted = persisted_rx
            .wait_for(|persisted| persisted.seq >= target)
            .await
            .map_err(|_| StoreError::WriterGone)?;

        match &persisted.error {
            Some(message) => Err(StoreError::WriteFailed(message.clone())),
            None => Ok(()),
        }
    }

    /// Apply a transition; publish and log only if it changed the cart.
    fn commit<F>(&self, operation: &'static str, id: &ProductId, transition: F)
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let changed = self.inner.committed_tx.send_if_modified(|state| {
            let changed = transition(&mut state.cart);
            if changed {
                state.seq += 1;
            }
            changed
        });

        if changed {
            self.publish_view(operation, Some(id));
        } else {
            debug!(operation, product_id = %id, "no-op: no matching line");
        }
    }

    fn publish_view(&self, operation: &'static str, id: Option<&ProductId>) {
        let state = self.inner.committed_tx.borrow().clone();
        debug!(
            operation,
            product_id = id.map(ProductId::as_str),
            seq = state.seq,
            lines = state.cart.len(),
            "cart updated"
        );
        // Receivers may all be gone; that just means nobody is watching.
        let _ = self.inner.view_tx.send(state.cart);
    }
}

/// Persistence writer: watch committed state, mirror it to storage.
///
/// Runs until the store is dropped. Each pass serializes the latest
/// committed state; if more mutations land during a write, the next pass
/// picks up only the newest state.
async fn run_writer(
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    mut committed_rx: watch::Receiver<Committed>,
    persisted_tx: watch::Sender<Persisted>,
) {
    loop {
        let (seq, cart) = {
            let committed = committed_rx.borrow_and_update();
            (committed.seq, committed.cart.clone())
        };

        if seq > persisted_tx.borrow().seq {
            let error = match write_snapshot(storage.as_ref(), &key, &cart).await {
                Ok(()) => {
                    debug!(%key, seq, lines = cart.len(), "persisted cart snapshot");
                    None
                }
                Err(err) => {
                    error!(%key, seq, %err, "failed to persist cart snapshot");
                    Some(err.to_string())
                }
            };
            if persisted_tx.send(Persisted { seq, error }).is_err() {
                // Store dropped while we were writing.
                break;
            }
        }

        if committed_rx.changed().await.is_err() {
            break;
        }
    }
}

async fn write_snapshot(storage: &dyn KeyValueStorage, key: &str, cart: &Cart) -> Result<()> {
    if cart.is_empty() {
        storage.remove(key).await?;
    } else {
        let payload = snapshot::encode(cart)?;
        storage.set(key, &payload).await?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use crate::snapshot::CART_KEY;
    use crate::storage::MemoryStorage;

    use super::*;

    fn descriptor(id: &str) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://img.example/{id}.png"),
            price: Decimal::new(1000, 2),
        }
    }

    async fn stored_cart(storage: &MemoryStorage) -> Option<Cart> {
        let raw = storage.get(CART_KEY).await.unwrap();
        match snapshot::decode(raw.as_deref()) {
            Snapshot::Valid(cart) => Some(cart),
            Snapshot::Absent => None,
            Snapshot::Malformed { reason } => panic!("malformed snapshot in test: {reason}"),
        }
    }

    #[tokio::test]
    async fn test_open_with_absent_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage, CART_KEY).await;
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_open_with_malformed_snapshot_starts_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CART_KEY, "{{ not json").await.unwrap();

        let store = CartStore::open(storage.clone(), CART_KEY).await;
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_persisted_state_matches_memory_after_flush() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), CART_KEY).await;

        store.add_to_cart(descriptor("A"));
        store.add_to_cart(descriptor("B"));
        store.increment(&ProductId::new("A"));
        store.flush().await.unwrap();

        let stored = stored_cart(&storage).await.unwrap();
        assert_eq!(stored, store.cart());
        assert_eq!(stored.get(&ProductId::new("A")).unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_reopen_restores_cart() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let store = CartStore::open(storage.clone(), CART_KEY).await;
            store.add_to_cart(descriptor("A"));
            store.add_to_cart(descriptor("A"));
            store.flush().await.unwrap();
        }

        let store = CartStore::open(storage, CART_KEY).await;
        let products = store.products();
        assert_eq!(products.len(), 1);
        assert_eq!(products.first().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_empty_cart_removes_stored_key() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), CART_KEY).await;

        store.add_to_cart(descriptor("A"));
        store.flush().await.unwrap();
        assert!(storage.get(CART_KEY).await.unwrap().is_some());

        store.decrement(&ProductId::new("A"));
        store.flush().await.unwrap();
        assert!(storage.get(CART_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clear_empties_cart_and_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), CART_KEY).await;

        store.add_to_cart(descriptor("A"));
        store.add_to_cart(descriptor("B"));
        store.clear();
        store.flush().await.unwrap();

        assert!(store.products().is_empty());
        assert!(storage.get(CART_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_operations_do_not_wake_subscribers() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage, CART_KEY).await;
        store.add_to_cart(descriptor("A"));

        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.increment(&ProductId::new("missing"));
        store.decrement(&ProductId::new("missing"));
        store.clear();
        store.clear(); // second clear is a no-op on an empty cart
        assert!(rx.has_changed().unwrap()); // first clear notified

        rx.mark_unchanged();
        store.increment(&ProductId::new("missing"));
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_subscriber_sees_committed_state() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage, CART_KEY).await;
        let mut rx = store.subscribe();

        store.add_to_cart(descriptor("A"));
        rx.changed().await.unwrap();

        let cart = rx.borrow_and_update().clone();
        assert_eq!(cart.total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_rapid_mutations_converge() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone(), CART_KEY).await;

        for _ in 0..100 {
            store.add_to_cart(descriptor("A"));
        }
        store.flush().await.unwrap();

        let stored = stored_cart(&storage).await.unwrap();
        assert_eq!(stored.get(&ProductId::new("A")).unwrap().quantity, 100);
        assert_eq!(stored, store.cart());
    }

    #[tokio::test]
    async fn test_flush_on_untouched_store_is_ok() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage, CART_KEY).await;
        store.flush().await.unwrap();
    }
}
