//! HTTP diagnostics for a running linker.

use crate::protocol::{Address, ServiceCategory};
use crate::registry::Registry;

use axum::extract::Extension;
use axum::routing::get;
use axum::{Json, Router};
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::Arc;

pub const ENDPOINT_REGISTRY: &str = "/registry";
pub const ENDPOINT_HEALTH: &str = "/health";

/// Registry snapshot in sorted order, serialized as-is.
pub type RegistryView = BTreeMap<ServiceCategory, BTreeSet<Address>>;

pub fn router(registry: Arc<Registry>) -> Router {
    Router::new()
        .route(ENDPOINT_REGISTRY, get(handle_registry))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(registry))
}

pub async fn serve(addr: SocketAddr, registry: Arc<Registry>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Diagnostics HTTP server listening on {}", addr);

    axum::serve(listener, router(registry)).await?;
    Ok(())
}

pub async fn handle_registry(Extension(registry): Extension<Arc<Registry>>) -> Json<RegistryView> {
    let view: RegistryView = registry
        .snapshot()
        .await
        .into_iter()
        .map(|(category, addresses)| (category, addresses.into_iter().collect()))
        .collect();

    Json(view)
}

pub async fn handle_health() -> &'static str {
    "ok"
}
