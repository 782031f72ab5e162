//! Signature device HTTP service.
//!
//! Thin axum front end over `sigchain-core`: JSON codec, route dispatch, and
//! error-class to status-code mapping. All signing semantics live in the core.

mod api;
mod device;
mod transaction;


use std::sync::Arc;

use sigchain_core::{DeviceService, InMemoryDeviceRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let listen_addr =
        std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8600".to_string());

    let repository = Arc::new(InMemoryDeviceRepository::new());
    let service = Arc::new(DeviceService::new(repository));
    let app = api::router(service);

    tracing::info!("sigchain-server listening on {listen_addr}");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
