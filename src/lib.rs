//! Padaria storefront
//!
//! Bakery storefront core: a read-only product catalog, an observable cart
//! store and a checkout flow, served over a small JSON API.
//!
//! ## Features
//! - Catalog queries (by id, category, featured, text search)
//! - Shopping cart with change subscriptions
//! - Checkout with form validation and delivery fee
//! - Mock order history
//! - Contact form

pub mod api;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod contact;
pub mod domain;
pub mod seed;
pub mod store;

use thiserror::Error;

use crate::domain::aggregates::{CartError, OrderError};

pub use catalog::Catalog;
pub use checkout::{CheckoutConfirmation, CheckoutForm, CheckoutService, DeliveryMethod, Latency, SimulatedLatency};
pub use config::Config;
pub use contact::{ContactForm, ContactReceipt, ContactService};
pub use store::{CartSessions, CartSnapshot, CartStore, Subscription};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Cart not found: {0}")]
    CartNotFound(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid form: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl From<CartError> for StorefrontError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::Unavailable(id) => Self::ProductUnavailable(id.to_string()),
            CartError::TooMany { quantity, .. } => Self::InvalidQuantity(i64::from(quantity.value())),
        }
    }
}

impl From<OrderError> for StorefrontError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::NoItems => Self::EmptyCart,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;
