//! Domain events
use crate::domain::value_objects::{ProductId, Quantity};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded { product_id: ProductId, quantity: Quantity },
    QuantityUpdated { product_id: ProductId, quantity: Quantity },
    ItemRemoved { product_id: ProductId },
    Cleared,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderEvent {
    Placed { order_id: String, item_count: u64 },
}
