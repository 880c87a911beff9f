//! Order Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::domain::aggregates::{CartEntry, Product};
use crate::domain::events::OrderEvent;

#[derive(Clone, Debug, Serialize)]
pub struct Order {
    id: String,
    items: Vec<OrderItem>,
    subtotal: Decimal,
    delivery_fee: Decimal,
    total: Decimal,
    status: OrderStatus,
    payment_method: PaymentMethod,
    payment_status: PaymentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pix_code: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_address: Option<DeliveryAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<String>,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

/// A purchased line; `price` is frozen at purchase time
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderItem { pub product: Product, pub quantity: u32, pub price: Decimal }

impl OrderItem {
    pub fn line_total(&self) -> Decimal { self.price * Decimal::from(self.quantity) }
}

impl From<&CartEntry> for OrderItem {
    fn from(e: &CartEntry) -> Self { Self { product: e.product.clone(), quantity: e.quantity.value(), price: e.product.price() } }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DeliveryAddress {
    #[validate(length(min = 1))] pub street: String,
    #[validate(length(min = 1))] pub number: String,
    #[serde(default)] pub complement: Option<String>,
    #[validate(length(min = 1))] pub neighborhood: String,
    #[validate(length(min = 1))] pub city: String,
    #[validate(length(min = 1))] pub state: String,
    #[validate(length(min = 1))] pub zip_code: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus { #[default] Pending, Paid, Preparing, Ready, Delivered, Cancelled }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod { #[default] Pix, Credit, Debit, Cash }

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus { #[default] Pending, Paid, Failed }

impl OrderStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Aguardando Pagamento",
            Self::Paid => "Pago",
            Self::Preparing => "Preparando",
            Self::Ready => "Pronto para Entrega",
            Self::Delivered => "Entregue",
            Self::Cancelled => "Cancelado",
        }
    }
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pix => "PIX",
            Self::Credit => "Cartão de Crédito",
            Self::Debit => "Cartão de Débito",
            Self::Cash => "Dinheiro",
        }
    }
}

impl Order {
    /// Builds a pending order from cart lines. Prices are copied out of the products.
    pub fn place(id: impl Into<String>, entries: &[CartEntry], payment_method: PaymentMethod, delivery_fee: Decimal) -> Result<Self, OrderError> {
        if entries.is_empty() { return Err(OrderError::NoItems); }
        let items: Vec<OrderItem> = entries.iter().map(OrderItem::from).collect();
        let mut order = Self::with_items(id, items, payment_method, delivery_fee, Utc::now());
        let item_count = order.items.iter().map(|i| u64::from(i.quantity)).sum();
        order.raise_event(OrderEvent::Placed { order_id: order.id.clone(), item_count });
        Ok(order)
    }

    pub(crate) fn with_items(id: impl Into<String>, items: Vec<OrderItem>, payment_method: PaymentMethod, delivery_fee: Decimal, at: DateTime<Utc>) -> Self {
        let subtotal = items.iter().map(OrderItem::line_total).sum();
        Self {
            id: id.into(), items, subtotal, delivery_fee, total: subtotal + delivery_fee,
            status: OrderStatus::Pending, payment_method, payment_status: PaymentStatus::Pending,
            pix_code: None, created_at: at, updated_at: at, delivery_address: None, notes: None, events: vec![],
        }
    }

    pub fn with_address(mut self, address: Option<DeliveryAddress>) -> Self { self.delivery_address = address; self }
    pub fn with_notes(mut self, notes: Option<String>) -> Self { self.notes = notes.filter(|n| !n.trim().is_empty()); self }
    pub fn with_pix_code(mut self, code: impl Into<String>) -> Self { self.pix_code = Some(code.into()); self }
    pub(crate) fn with_status(mut self, status: OrderStatus, payment: PaymentStatus, updated_at: DateTime<Utc>) -> Self {
        self.status = status;
        self.payment_status = payment;
        self.updated_at = updated_at;
        self
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn items(&self) -> &[OrderItem] { &self.items }
    pub fn subtotal(&self) -> Decimal { self.subtotal }
    pub fn delivery_fee(&self) -> Decimal { self.delivery_fee }
    pub fn total(&self) -> Decimal { self.total }
    pub fn status(&self) -> OrderStatus { self.status }
    pub fn payment_method(&self) -> PaymentMethod { self.payment_method }
    pub fn payment_status(&self) -> PaymentStatus { self.payment_status }
    pub fn pix_code(&self) -> Option<&str> { self.pix_code.as_deref() }
    pub fn created_at(&self) -> DateTime<Utc> { self.created_at }
    pub fn delivery_address(&self) -> Option<&DeliveryAddress> { self.delivery_address.as_ref() }
    pub fn notes(&self) -> Option<&str> { self.notes.as_deref() }

    pub fn take_events(&mut self) -> Vec<OrderEvent> { std::mem::take(&mut self.events) }
    fn raise_event(&mut self, e: OrderEvent) { self.events.push(e); }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("order has no items")]
    NoItems,
}
