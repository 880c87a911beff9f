//! JSON API over the catalog, the session carts, checkout and the order history.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::checkout::{CheckoutConfirmation, CheckoutForm, CheckoutService, CheckoutSummary, DeliveryMethod, SimulatedLatency};
use crate::config::Config;
use crate::contact::{ContactForm, ContactReceipt, ContactService};
use crate::domain::aggregates::{Category, Order, Product};
use crate::store::{CartSessions, CartSnapshot, CartStore};
use crate::{Catalog, StorefrontError};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub carts: CartSessions,
    pub checkout: Arc<CheckoutService<SimulatedLatency>>,
    pub contact: Arc<ContactService<SimulatedLatency>>,
    pub orders: Arc<Vec<Order>>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, StorefrontError> {
        let catalog = Catalog::seeded()?;
        let orders = crate::seed::sample_orders(&catalog, Utc::now());
        let latency = SimulatedLatency(config.checkout_delay);
        Ok(Self {
            catalog: Arc::new(catalog),
            carts: CartSessions::new(),
            checkout: Arc::new(CheckoutService::new(latency, config.delivery_fee)),
            contact: Arc::new(ContactService::new(latency)),
            orders: Arc::new(orders),
        })
    }

    fn cart(&self, session: Uuid) -> Result<CartStore, StorefrontError> {
        self.carts.get(&session).ok_or_else(|| StorefrontError::CartNotFound(session.to_string()))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "padaria-storefront"})) }))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/featured", get(featured_products))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/cart", post(open_cart))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart).delete(close_cart))
        .route("/api/v1/cart/:session/items", delete(clear_cart))
        .route("/api/v1/cart/:session/items/:product_id", put(update_quantity).delete(remove_from_cart))
        .route("/api/v1/checkout/:session", get(checkout_summary).post(checkout))
        .route("/api/v1/orders", get(list_orders))
        .route("/api/v1/contact", post(send_contact))
        .with_state(state)
}

impl IntoResponse for StorefrontError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::ProductNotFound(_) | Self::CartNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidQuantity(_) => StatusCode::BAD_REQUEST,
            Self::ProductUnavailable(_) | Self::EmptyCart => StatusCode::CONFLICT,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::DuplicateProduct(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }
        let body = match &self {
            Self::Validation(fields) => serde_json::json!({"error": self.to_string(), "fields": fields}),
            _ => serde_json::json!({"error": self.to_string()}),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, StorefrontError>;

#[derive(Debug, Serialize)]
pub struct CategoryView { pub id: Category, pub label: &'static str }

async fn list_categories() -> Json<Vec<CategoryView>> {
    Json(Category::ALL.iter().map(|&id| CategoryView { id, label: id.label() }).collect())
}

#[derive(Debug, Default, Deserialize)]
pub struct BrowseParams { pub category: Option<Category>, pub search: Option<String> }

async fn list_products(State(s): State<AppState>, Query(p): Query<BrowseParams>) -> Json<Vec<Product>> {
    Json(s.catalog.browse(p.category, p.search.as_deref()).into_iter().cloned().collect())
}

async fn featured_products(State(s): State<AppState>) -> Json<Vec<Product>> {
    Json(s.catalog.featured().into_iter().cloned().collect())
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Product> {
    s.catalog.get_by_id(&id).cloned().map(Json).ok_or(StorefrontError::ProductNotFound(id))
}

#[derive(Debug, Serialize)]
pub struct OpenedCart { pub session: Uuid, pub cart: CartSnapshot }

async fn open_cart(State(s): State<AppState>) -> (StatusCode, Json<OpenedCart>) {
    let (session, store) = s.carts.open();
    (StatusCode::CREATED, Json(OpenedCart { session, cart: store.snapshot() }))
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<Uuid>) -> ApiResult<CartSnapshot> {
    Ok(Json(s.cart(session)?.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest { pub product_id: String, #[serde(default = "one")] pub quantity: i64 }

fn one() -> i64 { 1 }

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<Uuid>, Json(r): Json<AddToCartRequest>) -> ApiResult<CartSnapshot> {
    let store = s.cart(session)?;
    let product = s.catalog.get_by_id(&r.product_id).ok_or_else(|| StorefrontError::ProductNotFound(r.product_id.clone()))?;
    let quantity = u32::try_from(r.quantity).map_err(|_| StorefrontError::InvalidQuantity(r.quantity))?;
    store.add_to_cart(product, quantity)?;
    Ok(Json(store.snapshot()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest { pub quantity: i64 }

async fn update_quantity(State(s): State<AppState>, Path((session, product_id)): Path<(Uuid, String)>, Json(r): Json<UpdateQuantityRequest>) -> ApiResult<CartSnapshot> {
    let store = s.cart(session)?;
    // anything below one removes the line
    let quantity = u32::try_from(r.quantity.max(0)).map_err(|_| StorefrontError::InvalidQuantity(r.quantity))?;
    store.update_quantity(&product_id, quantity);
    Ok(Json(store.snapshot()))
}

async fn remove_from_cart(State(s): State<AppState>, Path((session, product_id)): Path<(Uuid, String)>) -> ApiResult<CartSnapshot> {
    let store = s.cart(session)?;
    store.remove_from_cart(&product_id);
    Ok(Json(store.snapshot()))
}

async fn close_cart(State(s): State<AppState>, Path(session): Path<Uuid>) -> Result<StatusCode, StorefrontError> {
    if s.carts.close(&session) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StorefrontError::CartNotFound(session.to_string()))
    }
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<Uuid>) -> ApiResult<CartSnapshot> {
    let store = s.cart(session)?;
    store.clear_cart();
    Ok(Json(store.snapshot()))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryParams { #[serde(default)] pub delivery_method: DeliveryMethod }

async fn checkout_summary(State(s): State<AppState>, Path(session): Path<Uuid>, Query(p): Query<SummaryParams>) -> ApiResult<CheckoutSummary> {
    let store = s.cart(session)?;
    Ok(Json(s.checkout.summary(&store, p.delivery_method)))
}

async fn checkout(State(s): State<AppState>, Path(session): Path<Uuid>, Json(form): Json<CheckoutForm>) -> Result<(StatusCode, Json<CheckoutConfirmation>), StorefrontError> {
    let store = s.cart(session)?;
    let confirmation = s.checkout.submit(&store, form).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// An order as listed in the history, with display labels alongside the codes.
#[derive(Debug, Serialize)]
pub struct OrderView<'a> {
    #[serde(flatten)]
    pub order: &'a Order,
    pub status_label: &'static str,
    pub payment_method_label: &'static str,
}

impl<'a> From<&'a Order> for OrderView<'a> {
    fn from(order: &'a Order) -> Self {
        Self { order, status_label: order.status().label(), payment_method_label: order.payment_method().label() }
    }
}

async fn list_orders(State(s): State<AppState>) -> Response {
    let views: Vec<OrderView<'_>> = s.orders.iter().map(OrderView::from).collect();
    Json(views).into_response()
}

async fn send_contact(State(s): State<AppState>, Json(form): Json<ContactForm>) -> Result<(StatusCode, Json<ContactReceipt>), StorefrontError> {
    let receipt = s.contact.submit(form).await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}
