//! Checkout: form validation, the simulated order submission and the summary shown beside the form.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::aggregates::{DeliveryAddress, Order, PaymentMethod};
use crate::seed::PIX_CODE;
use crate::store::CartStore;
use crate::{Result, StorefrontError};

/// Stand-in for the round trip to an order backend.
pub trait Latency: Send + Sync {
    fn wait(&self) -> impl Future<Output = ()> + Send;
}

/// Sleeps on the tokio timer for a fixed duration.
#[derive(Clone, Copy, Debug)]
pub struct SimulatedLatency(pub Duration);

impl Latency for SimulatedLatency {
    fn wait(&self) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod { #[default] Delivery, Pickup }

#[derive(Clone, Debug, Default, Deserialize, Validate)]
pub struct CheckoutForm {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
    #[serde(default)]
    pub address: Option<DeliveryAddress>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub terms_accepted: bool,
}

impl CheckoutForm {
    /// Field rules plus the cross-field ones: delivery needs a complete address, terms must be accepted.
    pub fn check(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);
        if self.delivery_method == DeliveryMethod::Delivery {
            match &self.address {
                None => errors.add("address", ValidationError::new("required")),
                Some(address) if address.validate().is_err() => errors.add("address", ValidationError::new("incomplete")),
                Some(_) => {}
            }
        }
        if !self.terms_accepted {
            errors.add("terms_accepted", ValidationError::new("must_accept"));
        }
        if errors.errors().is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct CheckoutConfirmation {
    pub order: Order,
}

#[derive(Clone, Debug)]
pub struct CheckoutService<L = SimulatedLatency> {
    latency: L,
    delivery_fee: Decimal,
}

impl<L: Latency> CheckoutService<L> {
    pub fn new(latency: L, delivery_fee: Decimal) -> Self { Self { latency, delivery_fee } }

    pub fn delivery_fee(&self, method: DeliveryMethod) -> Decimal {
        match method {
            DeliveryMethod::Delivery => self.delivery_fee,
            DeliveryMethod::Pickup => Decimal::ZERO,
        }
    }

    pub fn summary(&self, store: &CartStore, method: DeliveryMethod) -> CheckoutSummary {
        let subtotal = store.cart_total();
        let delivery_fee = self.delivery_fee(method);
        CheckoutSummary { subtotal, delivery_fee, total: subtotal + delivery_fee }
    }

    /// Validates the form, waits out the simulated submission, then turns the
    /// cart into a pending order and empties it. Nothing is persisted.
    pub async fn submit(&self, store: &CartStore, form: CheckoutForm) -> Result<CheckoutConfirmation> {
        if store.is_empty() {
            return Err(StorefrontError::EmptyCart);
        }
        form.check()?;

        info!(payment = ?form.payment_method, delivery = ?form.delivery_method, "submitting order");
        self.latency.wait().await;

        let cart = store.drain();
        let address = match form.delivery_method {
            DeliveryMethod::Delivery => form.address,
            DeliveryMethod::Pickup => None,
        };
        let mut order = Order::place(order_number(), &cart.entries, form.payment_method, self.delivery_fee(form.delivery_method))?
            .with_address(address)
            .with_notes(form.notes);
        if form.payment_method == PaymentMethod::Pix {
            order = order.with_pix_code(PIX_CODE);
        }
        for event in order.take_events() {
            info!(?event, total = %order.total(), "order placed");
        }
        Ok(CheckoutConfirmation { order })
    }
}

fn order_number() -> String {
    format!("{:06}", rand::rng().random_range(0..1_000_000u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Immediate(Arc<AtomicUsize>);

    impl Latency for Immediate {
        fn wait(&self) -> impl Future<Output = ()> + Send {
            self.0.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    fn service() -> (CheckoutService<Immediate>, Arc<AtomicUsize>) {
        let latency = Immediate::default();
        let calls = Arc::clone(&latency.0);
        (CheckoutService::new(latency, Decimal::new(500, 2)), calls)
    }

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            street: "Rua das Flores".into(), number: "123".into(), complement: None,
            neighborhood: "Centro".into(), city: "São Paulo".into(), state: "SP".into(), zip_code: "01001-000".into(),
        }
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Maria".into(), phone: "11 99999-0000".into(), email: "maria@example.com".into(),
            address: Some(address()), terms_accepted: true, ..Default::default()
        }
    }

    fn filled_cart() -> CartStore {
        let catalog = Catalog::seeded().unwrap();
        let store = CartStore::new();
        store.add_to_cart(catalog.get_by_id("1").unwrap(), 12).unwrap();
        store.add_to_cart(catalog.get_by_id("2").unwrap(), 1).unwrap();
        store
    }

    #[tokio::test]
    async fn delivery_order_adds_fee_and_clears_cart() {
        let (checkout, waits) = service();
        let store = filled_cart();
        let confirmation = checkout.submit(&store, form()).await.unwrap();
        let order = confirmation.order;
        assert_eq!(order.subtotal(), Decimal::new(4190, 2));
        assert_eq!(order.total(), Decimal::new(4690, 2));
        assert_eq!(order.id().len(), 6);
        assert!(order.id().chars().all(|c| c.is_ascii_digit()));
        assert_eq!(order.pix_code(), Some(PIX_CODE));
        assert_eq!(order.delivery_address(), Some(&address()));
        assert!(store.is_empty());
        assert_eq!(waits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pickup_has_no_fee_or_address() {
        let (checkout, _) = service();
        let store = filled_cart();
        let form = CheckoutForm { delivery_method: DeliveryMethod::Pickup, address: None, payment_method: PaymentMethod::Cash, ..form() };
        let order = checkout.submit(&store, form).await.unwrap().order;
        assert_eq!(order.delivery_fee(), Decimal::ZERO);
        assert_eq!(order.total(), Decimal::new(4190, 2));
        assert_eq!(order.pix_code(), None);
        assert!(order.delivery_address().is_none());
    }

    #[tokio::test]
    async fn invalid_form_leaves_cart_alone() {
        let (checkout, waits) = service();
        let store = filled_cart();
        let bad = CheckoutForm { email: "not-an-email".into(), terms_accepted: false, address: None, ..form() };
        let err = checkout.submit(&store, bad).await.unwrap_err();
        let errors = match err {
            StorefrontError::Validation(errors) => errors,
            other => panic!("expected form errors, got {other:?}"),
        };
        let fields = errors.errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("terms_accepted"));
        assert!(fields.contains_key("address"));
        assert_eq!(store.item_count(), 13);
        assert_eq!(waits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_cart_rejected() {
        let (checkout, _) = service();
        let err = checkout.submit(&CartStore::new(), form()).await.unwrap_err();
        assert!(matches!(err, StorefrontError::EmptyCart));
    }

    #[tokio::test]
    async fn ordered_prices_are_frozen() {
        let (checkout, _) = service();
        let store = filled_cart();
        let order = checkout.submit(&store, form()).await.unwrap().order;
        let prices: Vec<Decimal> = order.items().iter().map(|i| i.price).collect();
        assert_eq!(prices, vec![Decimal::new(50, 2), Decimal::new(3590, 2)]);
    }

    #[test]
    fn incomplete_address_flagged() {
        let form = CheckoutForm { address: Some(DeliveryAddress { city: String::new(), ..address() }), ..form() };
        let errors = form.check().unwrap_err();
        assert!(errors.errors().contains_key("address"));
    }

    #[test]
    fn spelled_out_state_accepted() {
        let form = CheckoutForm { address: Some(DeliveryAddress { state: "Paraná".into(), ..address() }), ..form() };
        assert!(form.check().is_ok());
    }

    #[test]
    fn summary_uses_live_cart() {
        let (checkout, _) = service();
        let store = filled_cart();
        assert_eq!(checkout.summary(&store, DeliveryMethod::Pickup).total, Decimal::new(4190, 2));
        assert_eq!(checkout.summary(&store, DeliveryMethod::Delivery).total, Decimal::new(4690, 2));
    }
}
