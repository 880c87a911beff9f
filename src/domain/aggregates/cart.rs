//! Cart Aggregate

use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::Product;
use crate::domain::events::CartEvent;
use crate::domain::value_objects::{ProductId, Quantity};

/// Cart lines in insertion order, at most one per product id
#[derive(Clone, Debug, Default)]
pub struct Cart {
    entries: Vec<CartEntry>,
    events: Vec<CartEvent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CartEntry {
    pub product: Product,
    pub quantity: Quantity,
}

impl CartEntry {
    pub fn line_total(&self) -> Decimal { self.product.price() * Decimal::from(self.quantity.value()) }
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn entries(&self) -> &[CartEntry] { &self.entries }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> { self.entries.iter().find(|e| e.product.id() == product_id) }

    pub fn total(&self) -> Decimal { self.entries.iter().map(CartEntry::line_total).sum() }
    /// Summed as u64 so several large lines cannot wrap.
    pub fn item_count(&self) -> u64 { self.entries.iter().map(|e| u64::from(e.quantity.value())).sum() }

    pub fn add_item(&mut self, product: &Product, quantity: Quantity) -> Result<(), CartError> {
        if !product.is_available() { return Err(CartError::Unavailable(product.id().clone())); }
        if let Some(existing) = self.entries.iter_mut().find(|e| e.product.id() == product.id()) {
            existing.quantity = existing.quantity.add(quantity)
                .map_err(|_| CartError::TooMany { product_id: product.id().clone(), quantity })?;
        } else {
            self.entries.push(CartEntry { product: product.clone(), quantity });
        }
        self.raise_event(CartEvent::ItemAdded { product_id: product.id().clone(), quantity });
        Ok(())
    }

    /// Values below one remove the line. Returns whether anything changed.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) -> bool {
        let Some(pos) = self.position(product_id) else { return false };
        match Quantity::new(quantity) {
            Err(_) => {
                let removed = self.entries.remove(pos);
                self.raise_event(CartEvent::ItemRemoved { product_id: removed.product.id().clone() });
            }
            Ok(q) if self.entries[pos].quantity == q => return false,
            Ok(q) => {
                self.entries[pos].quantity = q;
                let product_id = self.entries[pos].product.id().clone();
                self.raise_event(CartEvent::QuantityUpdated { product_id, quantity: q });
            }
        }
        true
    }

    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let Some(pos) = self.position(product_id) else { return false };
        let removed = self.entries.remove(pos);
        self.raise_event(CartEvent::ItemRemoved { product_id: removed.product.id().clone() });
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.entries.is_empty() { return false; }
        self.entries.clear();
        self.raise_event(CartEvent::Cleared);
        true
    }

    pub fn take_events(&mut self) -> Vec<CartEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: CartEvent) { self.events.push(e); }
    fn position(&self, product_id: &str) -> Option<usize> { self.entries.iter().position(|e| e.product.id() == product_id) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("product {0} is not available")]
    Unavailable(ProductId),
    #[error("adding {quantity} of product {product_id} exceeds the line limit")]
    TooMany { product_id: ProductId, quantity: Quantity },
}
