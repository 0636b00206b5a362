//! Cart store: the single source of truth for cart contents.
//!
//! [`CartStore`] owns the in-memory [`Cart`], writes the full snapshot to
//! storage after every mutation, then publishes [`CartEvent`]s so views
//! (badge, cart table, totals) can re-derive what they show.
//!
//! Cart operations never fail from the caller's point of view. A stored
//! value that is missing or unreadable loads as an empty cart; a failed
//! write is logged and the in-memory cart stays authoritative for the rest
//! of the session.

use farmers_market_core::cart::AddOutcome;
use farmers_market_core::{Cart, CartLineItem, Price, ProductRecord, Quantity};
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use crate::storage::{KeyValueStorage, StorageError, keys};

/// Capacity of the event channel. Slow subscribers miss old events.
const EVENT_CAPACITY: usize = 64;

/// Notification published after a cart mutation.
///
/// All variants are advisory; none of them signal an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    /// The cart changed; carries the new snapshot.
    Updated { cart: Cart },
    /// The badge count (sum of quantities) after the change.
    CountChanged { count: u32 },
    /// A product was added.
    ItemAdded { name: String },
    /// A remove was requested.
    ItemRemoved,
}

/// Write-through cart store over a [`KeyValueStorage`].
pub struct CartStore<S> {
    storage: S,
    cart: Cart,
    events: broadcast::Sender<CartEvent>,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Open the store, hydrating the cart from storage.
    pub fn open(storage: S) -> Self {
        let cart = load_cart(&storage);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        debug!(lines = cart.len(), "cart loaded");
        Self {
            storage,
            cart,
            events,
        }
    }

    /// Read the persisted cart.
    ///
    /// Returns an empty cart when nothing is stored or the stored value
    /// cannot be parsed.
    #[must_use]
    pub fn load(&self) -> Cart {
        load_cart(&self.storage)
    }

    /// Subscribe to cart events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add(&mut self, product: &ProductRecord) {
        match self.cart.add(product) {
            AddOutcome::Inserted => debug!(product = %product.canonical_id(), "cart line added"),
            AddOutcome::Incremented(quantity) => {
                debug!(product = %product.canonical_id(), %quantity, "cart line incremented");
            }
        }
        self.commit();
        self.publish(CartEvent::ItemAdded {
            name: product.name.clone(),
        });
    }

    /// Remove every line for `id`. Persists and notifies even if nothing matched.
    pub fn remove(&mut self, id: &str) {
        if !self.cart.remove(id) {
            debug!(product = id, "remove for product not in cart");
        }
        self.commit();
        self.publish(CartEvent::ItemRemoved);
    }

    /// Set the quantity for `id`. Unknown identifiers are ignored.
    pub fn set_quantity(&mut self, id: &str, quantity: Quantity) {
        if self.cart.set_quantity(id, quantity) {
            self.commit();
        } else {
            debug!(product = id, "quantity update for product not in cart");
        }
    }

    /// Set the quantity for `id` from raw user input, clamping to at least 1.
    pub fn set_quantity_input(&mut self, id: &str, input: &str) {
        self.set_quantity(id, Quantity::parse_clamped(input));
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.clear();
        self.commit();
    }

    /// Sum of `price × quantity`.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    /// Sum of quantities (badge count).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart.clone()
    }

    /// Current lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[CartLineItem] {
        self.cart.lines()
    }

    /// Persist the snapshot, then announce the change.
    fn commit(&self) {
        self.persist();
        self.publish(CartEvent::Updated {
            cart: self.cart.clone(),
        });
        self.publish(CartEvent::CountChanged {
            count: self.cart.item_count(),
        });
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.cart)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(keys::CART, &json));
        if let Err(e) = result {
            error!(error = %e, "failed to persist cart");
        }
    }

    fn publish(&self, event: CartEvent) {
        // No subscribers is fine: nothing is listening for changes.
        let _ = self.events.send(event);
    }
}

impl<S> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .finish_non_exhaustive()
    }
}

/// Read and parse the stored cart, falling back to an empty cart.
fn load_cart<S: KeyValueStorage>(storage: &S) -> Cart {
    let raw = match storage.get(keys::CART) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "failed to read stored cart, starting empty");
            return Cart::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(error = %e, "stored cart is malformed, starting empty");
        Cart::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use farmers_market_core::ProductId;

    use super::*;
    use crate::storage::MemoryStorage;

    fn tomatoes() -> ProductRecord {
        ProductRecord::new("demo-1", "Fresh Tomatoes", Price::from_units(60))
    }

    fn apples() -> ProductRecord {
        ProductRecord::new("demo-2", "Organic Apples", Price::from_units(150))
    }

    fn drain(rx: &mut broadcast::Receiver<CartEvent>) -> Vec<CartEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_load_after_add() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        store.add(&tomatoes());

        let loaded = CartStore::open(storage).load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.find("demo-1").unwrap().quantity, Quantity::ONE);
    }

    #[test]
    fn test_add_twice_merges() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add(&tomatoes());
        store.add(&tomatoes());

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.load().find("demo-1").unwrap().quantity.get(), 2);
    }

    #[test]
    fn test_remove_string_equal_id() {
        let storage = MemoryStorage::new();
        storage
            .set(
                keys::CART,
                r#"[{"_id": 101, "name": "Paneer", "price": 90, "quantity": 1}]"#,
            )
            .unwrap();

        let mut store = CartStore::open(storage);
        store.remove("101");
        assert!(store.snapshot().is_empty());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_add_then_remove_demo_id() {
        let mut store = CartStore::open(MemoryStorage::new());
        let mut product = tomatoes();
        product.id = None;
        product.object_id = Some(ProductId::new("demo-1"));

        store.add(&product);
        store.remove("demo-1");
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_quantity_floor() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add(&tomatoes());

        store.set_quantity_input("demo-1", "0");
        assert_eq!(store.lines()[0].quantity, Quantity::ONE);

        store.set_quantity_input("demo-1", "-5");
        assert_eq!(store.lines()[0].quantity, Quantity::ONE);

        store.set_quantity_input("demo-1", "lots");
        assert_eq!(store.lines()[0].quantity, Quantity::ONE);

        store.set_quantity_input("demo-1", "4");
        assert_eq!(store.load().find("demo-1").unwrap().quantity.get(), 4);
    }

    #[test]
    fn test_totals() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add(&tomatoes());
        store.add(&tomatoes());
        store.add(&apples());

        assert_eq!(store.total(), Price::from_units(270));
        assert_eq!(store.item_count(), 3);
    }

    #[test]
    fn test_missing_identifier_noops() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add(&tomatoes());
        let before = store.snapshot();

        store.remove("nonexistent");
        store.set_quantity("nonexistent", Quantity::clamped(5));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let storage = MemoryStorage::new();
        storage.set(keys::CART, "not-json").unwrap();

        let store = CartStore::open(storage);
        assert!(store.load().is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        store.add(&tomatoes());
        store.clear();

        assert_eq!(storage.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_event_order_on_add() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        let mut rx = store.subscribe();
        store.add(&tomatoes());

        let events = drain(&mut rx);
        let stored = storage.get(keys::CART).unwrap().unwrap();
        let persisted: Cart = serde_json::from_str(&stored).unwrap();
        assert!(persisted.find("demo-1").is_some());

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], CartEvent::Updated { cart } if cart.len() == 1));
        assert_eq!(events[1], CartEvent::CountChanged { count: 1 });
        assert_eq!(
            events[2],
            CartEvent::ItemAdded {
                name: "Fresh Tomatoes".to_string()
            }
        );
    }

    #[test]
    fn test_remove_notifies_even_when_absent() {
        let mut store = CartStore::open(MemoryStorage::new());
        let mut rx = store.subscribe();
        store.remove("nonexistent");

        let events = drain(&mut rx);
        assert_eq!(events.last(), Some(&CartEvent::ItemRemoved));
        assert!(events.contains(&CartEvent::CountChanged { count: 0 }));
    }

    #[test]
    fn test_unknown_quantity_update_is_silent() {
        let mut store = CartStore::open(MemoryStorage::new());
        let mut rx = store.subscribe();
        store.set_quantity("nonexistent", Quantity::clamped(2));
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_unknown_quantity_input_leaves_cart_unchanged() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        store.add(&tomatoes());
        let stored = storage.get(keys::CART).unwrap();
        let mut rx = store.subscribe();

        store.set_quantity_input("demo-9", "4");

        assert!(drain(&mut rx).is_empty());
        assert_eq!(store.item_count(), 1);
        assert_eq!(storage.get(keys::CART).unwrap(), stored);
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    #[test]
    fn test_write_failure_keeps_session_state() {
        let mut store = CartStore::open(ReadOnlyStorage);
        store.add(&tomatoes());
        assert_eq!(store.item_count(), 1);
        assert!(store.load().is_empty());
    }
}
