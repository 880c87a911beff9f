//! Padaria storefront - bakery catalog, cart and checkout service

use std::time::Duration;

use anyhow::Result;
use padaria_storefront::{api, Config};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let state = api::AppState::new(&config)?;
    tracing::info!(products = state.catalog.len(), orders = state.orders.len(), "catalog loaded");

    let carts = state.carts.clone();
    let max_idle = config.cart_idle;
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(max_idle.min(Duration::from_secs(60)).max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            carts.evict_idle(max_idle);
        }
    });

    let app = api::router(state).layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive());

    let addr = config.socket_addr();
    tracing::info!("Padaria storefront listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
