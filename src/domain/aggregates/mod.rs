//! Aggregates module
pub mod product;
pub mod order;
pub mod cart;

pub use product::{Category, NutritionalInfo, Product};
pub use order::{DeliveryAddress, Order, OrderError, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
pub use cart::{Cart, CartEntry, CartError};
