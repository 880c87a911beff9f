//! Observable cart store.
//!
//! [`CartStore`] is a cloneable handle around one [`Cart`]. Every mutation goes
//! through the store; views that need to follow the cart register a callback
//! with [`CartStore::subscribe`] and keep the returned [`Subscription`] alive for
//! as long as they want updates. Dropping it unregisters the callback.
//!
//! Callbacks run after the mutation is fully applied and the lock is released,
//! so they see a consistent [`CartSnapshot`] and may call back into the store.
//! Operations that change nothing (removing an absent line, clearing an empty
//! cart) do not notify.
//!
//! Every change bumps the store's `version`, which is stamped on the snapshot
//! handed to callbacks. When several threads mutate one store, callbacks may run
//! in any order; the highest version seen is always the latest state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::aggregates::{Cart, CartEntry, Product};
use crate::domain::events::CartEvent;
use crate::domain::value_objects::Quantity;
use crate::{Result, StorefrontError};

type Listener = Arc<dyn Fn(&CartEvent, &CartSnapshot) + Send + Sync>;

/// Point-in-time view of a cart, as handed to subscribers and API clients.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CartSnapshot {
    pub entries: Vec<CartEntry>,
    pub total: Decimal,
    pub item_count: u64,
    /// Number of changes applied to the store when this snapshot was taken.
    pub version: u64,
}

impl CartSnapshot {
    fn of(cart: &Cart, version: u64) -> Self {
        Self { entries: cart.entries().to_vec(), total: cart.total(), item_count: cart.item_count(), version }
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

#[derive(Default)]
struct Inner {
    cart: Cart,
    version: u64,
    listeners: Vec<(u64, Listener)>,
    next_listener: u64,
}

#[derive(Clone, Default)]
pub struct CartStore {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("CartStore")
            .field("lines", &inner.cart.entries().len())
            .field("version", &inner.version)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl CartStore {
    pub fn new() -> Self { Self::default() }

    /// Adds `quantity` units of `product`, merging into an existing line.
    pub fn add_to_cart(&self, product: &Product, quantity: u32) -> Result<()> {
        let quantity = Quantity::new(quantity).map_err(|_| StorefrontError::InvalidQuantity(i64::from(quantity)))?;
        self.apply(|cart, _| cart.add_item(product, quantity))?;
        Ok(())
    }

    /// Replaces a line's quantity; zero removes the line. Unknown ids are ignored.
    pub fn update_quantity(&self, product_id: &str, quantity: u32) {
        self.apply(|cart, _| cart.update_quantity(product_id, quantity));
    }

    pub fn remove_from_cart(&self, product_id: &str) {
        self.apply(|cart, _| cart.remove_item(product_id));
    }

    pub fn clear_cart(&self) {
        self.apply(|cart, _| cart.clear());
    }

    pub fn cart_total(&self) -> Decimal { self.lock().cart.total() }
    pub fn item_count(&self) -> u64 { self.lock().cart.item_count() }
    pub fn is_empty(&self) -> bool { self.lock().cart.is_empty() }
    pub fn version(&self) -> u64 { self.lock().version }
    pub fn snapshot(&self) -> CartSnapshot {
        let inner = self.lock();
        CartSnapshot::of(&inner.cart, inner.version)
    }

    /// Empties the cart and returns what it held, as one atomic step.
    pub(crate) fn drain(&self) -> CartSnapshot {
        self.apply(|cart, version| {
            let before = CartSnapshot::of(cart, version);
            cart.clear();
            before
        })
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&CartEvent, &CartSnapshot) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.push((id, Arc::new(callback)));
        Subscription { id, store: Arc::downgrade(&self.inner) }
    }

    pub fn subscriber_count(&self) -> usize { self.lock().listeners.len() }

    /// Runs `mutate` under the lock with the current version, then notifies.
    fn apply<T>(&self, mutate: impl FnOnce(&mut Cart, u64) -> T) -> T {
        let (out, events, snapshot, listeners) = {
            let mut inner = self.lock();
            let version = inner.version;
            let out = mutate(&mut inner.cart, version);
            let events = inner.cart.take_events();
            if events.is_empty() {
                return out;
            }
            inner.version += 1;
            let snapshot = CartSnapshot::of(&inner.cart, inner.version);
            let listeners: Vec<Listener> = inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (out, events, snapshot, listeners)
        };
        for event in &events {
            debug!(?event, version = snapshot.version, item_count = snapshot.item_count, total = %snapshot.total, "cart changed");
            for listener in &listeners {
                listener(event, &snapshot);
            }
        }
        out
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Keeps a cart callback registered; dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters the callback immediately"]
pub struct Subscription {
    id: u64,
    store: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

struct SessionCart {
    store: CartStore,
    touched: Instant,
    _audit: Subscription,
}

/// One cart per browsing session, keyed by an opaque session id.
#[derive(Clone, Default)]
pub struct CartSessions {
    carts: Arc<Mutex<HashMap<Uuid, SessionCart>>>,
}

impl CartSessions {
    pub fn new() -> Self { Self::default() }

    pub fn open(&self) -> (Uuid, CartStore) {
        let session = Uuid::new_v4();
        let store = CartStore::new();
        let audit = store.subscribe(move |event, snapshot| {
            info!(%session, ?event, item_count = snapshot.item_count, total = %snapshot.total, "session cart updated");
        });
        self.lock().insert(session, SessionCart { store: store.clone(), touched: Instant::now(), _audit: audit });
        info!(%session, "cart session opened");
        (session, store)
    }

    /// Looks up a session and marks it as recently used.
    pub fn get(&self, session: &Uuid) -> Option<CartStore> {
        self.lock().get_mut(session).map(|c| {
            c.touched = Instant::now();
            c.store.clone()
        })
    }

    /// Drops a session and its cart. Returns whether the session existed.
    pub fn close(&self, session: &Uuid) -> bool {
        let closed = self.lock().remove(session).is_some();
        if closed {
            info!(%session, "cart session closed");
        }
        closed
    }

    /// Drops every session not used within `max_idle`; returns how many went.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut carts = self.lock();
        let before = carts.len();
        carts.retain(|session, cart| {
            let keep = cart.touched.elapsed() < max_idle;
            if !keep {
                debug!(%session, "evicting idle cart session");
            }
            keep
        });
        let evicted = before - carts.len();
        if evicted > 0 {
            info!(evicted, remaining = carts.len(), "idle cart sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize { self.lock().len() }
    pub fn is_empty(&self) -> bool { self.lock().is_empty() }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, SessionCart>> {
        self.carts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn products() -> (Product, Product) {
        let catalog = Catalog::seeded().unwrap();
        (catalog.get_by_id("1").unwrap().clone(), catalog.get_by_id("2").unwrap().clone())
    }

    #[test]
    fn add_merges_and_totals() {
        let (p1, p2) = products();
        let store = CartStore::new();
        store.add_to_cart(&p1, 10).unwrap();
        store.add_to_cart(&p2, 1).unwrap();
        store.add_to_cart(&p1, 2).unwrap();

        let snap = store.snapshot();
        let lines: Vec<(String, u32)> = snap.entries.iter().map(|e| (e.product.id().to_string(), e.quantity.value())).collect();
        assert_eq!(lines, vec![("1".to_string(), 12), ("2".to_string(), 1)]);
        assert_eq!(store.cart_total(), Decimal::new(4190, 2));
        assert_eq!(store.item_count(), 13);
    }

    #[test]
    fn zero_quantity_add_rejected() {
        let (p1, _) = products();
        let store = CartStore::new();
        assert!(matches!(store.add_to_cart(&p1, 0), Err(StorefrontError::InvalidQuantity(0))));
        assert!(store.is_empty());
    }

    #[test]
    fn merge_past_line_limit_leaves_cart_untouched() {
        let (p1, _) = products();
        let store = CartStore::new();
        store.add_to_cart(&p1, u32::MAX).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _sub = store.subscribe(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });

        assert!(matches!(store.add_to_cart(&p1, 5), Err(StorefrontError::InvalidQuantity(5))));
        assert_eq!(store.item_count(), u64::from(u32::MAX));
        assert_eq!(store.version(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn update_to_zero_then_noop() {
        let (p1, _) = products();
        let store = CartStore::new();
        store.add_to_cart(&p1, 1).unwrap();
        store.update_quantity("1", 0);
        assert!(store.is_empty());
        store.update_quantity("1", 5);
        assert!(store.is_empty());
    }

    #[test]
    fn clear_always_zeroes() {
        let (p1, p2) = products();
        let store = CartStore::new();
        store.clear_cart();
        store.add_to_cart(&p1, 3).unwrap();
        store.add_to_cart(&p2, 2).unwrap();
        store.clear_cart();
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn total_matches_independent_sum() {
        let catalog = Catalog::seeded().unwrap();
        let store = CartStore::new();
        let mut expected = Decimal::ZERO;
        let mut count = 0;
        for (i, p) in catalog.all().iter().enumerate() {
            let qty = i as u32 + 1;
            store.add_to_cart(p, qty).unwrap();
            expected += p.price() * Decimal::from(qty);
            count += u64::from(qty);
        }
        assert_eq!(store.cart_total(), expected);
        assert_eq!(store.item_count(), count);
        assert_eq!(store.snapshot().entries.len(), catalog.len());
    }

    #[test]
    fn subscribers_see_post_mutation_state() {
        let (p1, _) = products();
        let store = CartStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = store.subscribe(move |event, snap| sink.lock().unwrap().push((event.clone(), snap.item_count)));

        store.add_to_cart(&p1, 2).unwrap();
        store.update_quantity("1", 5);
        store.remove_from_cart("missing");
        store.clear_cart();
        store.clear_cart();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].1, 2);
        assert_eq!(seen[1].1, 5);
        assert_eq!(seen[2], (CartEvent::Cleared, 0));
    }

    #[test]
    fn versions_increase_per_change() {
        let (p1, p2) = products();
        let store = CartStore::new();
        let versions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&versions);
        let _sub = store.subscribe(move |_, snap| sink.lock().unwrap().push(snap.version));

        store.add_to_cart(&p1, 1).unwrap();
        store.remove_from_cart("missing");
        store.add_to_cart(&p2, 1).unwrap();
        store.update_quantity("1", 3);
        store.clear_cart();

        assert_eq!(*versions.lock().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(store.snapshot().version, 4);
    }

    #[test]
    fn newest_version_matches_final_state_across_threads() {
        let (p1, p2) = products();
        let store = CartStore::new();
        let latest: Arc<Mutex<Option<CartSnapshot>>> = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&latest);
        let _sub = store.subscribe(move |_, snap| {
            let mut latest = sink.lock().unwrap();
            if latest.as_ref().map_or(true, |l| snap.version > l.version) {
                *latest = Some(snap.clone());
            }
        });

        let workers: Vec<_> = [p1, p2]
            .into_iter()
            .map(|p| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        store.add_to_cart(&p, 1).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let last = latest.lock().unwrap().clone().unwrap();
        assert_eq!(last.version, 400);
        assert_eq!(last, store.snapshot());
        assert_eq!(last.item_count, 400);
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let (p1, _) = products();
        let store = CartStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let sub = store.subscribe(move |_, _| { counter.fetch_add(1, Ordering::SeqCst); });
        store.add_to_cart(&p1, 1).unwrap();
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
        store.add_to_cart(&p1, 1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callbacks_may_read_the_store() {
        let (p1, _) = products();
        let store = CartStore::new();
        let reader = store.clone();
        let totals = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&totals);
        let _sub = store.subscribe(move |_, _| sink.lock().unwrap().push(reader.cart_total()));
        store.add_to_cart(&p1, 4).unwrap();
        assert_eq!(*totals.lock().unwrap(), vec![Decimal::new(200, 2)]);
    }

    #[test]
    fn stores_are_isolated() {
        let (p1, _) = products();
        let a = CartStore::new();
        let b = CartStore::new();
        a.add_to_cart(&p1, 1).unwrap();
        assert!(b.is_empty());
    }

    #[test]
    fn drain_returns_contents_and_empties() {
        let (p1, p2) = products();
        let store = CartStore::new();
        store.add_to_cart(&p1, 2).unwrap();
        store.add_to_cart(&p2, 1).unwrap();
        let drained = store.drain();
        assert_eq!(drained.item_count, 3);
        assert_eq!(drained.version, 2);
        assert_eq!(store.version(), 3);
        assert!(store.is_empty());
    }

    #[test]
    fn sessions_are_separate_carts() {
        let (p1, _) = products();
        let sessions = CartSessions::new();
        let (a, cart_a) = sessions.open();
        let (b, _) = sessions.open();
        cart_a.add_to_cart(&p1, 3).unwrap();
        assert_eq!(sessions.get(&a).unwrap().item_count(), 3);
        assert!(sessions.get(&b).unwrap().is_empty());
        assert!(sessions.get(&Uuid::new_v4()).is_none());
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn closed_session_is_gone() {
        let sessions = CartSessions::new();
        let (a, store) = sessions.open();
        assert!(sessions.close(&a));
        assert!(sessions.get(&a).is_none());
        assert!(!sessions.close(&a));
        assert!(sessions.is_empty());
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn idle_sessions_evicted() {
        let sessions = CartSessions::new();
        let (a, _) = sessions.open();
        sessions.open();
        assert_eq!(sessions.evict_idle(Duration::from_secs(3600)), 0);
        assert!(sessions.get(&a).is_some());
        assert_eq!(sessions.evict_idle(Duration::ZERO), 2);
        assert!(sessions.get(&a).is_none());
        assert!(sessions.is_empty());
    }
}
