//! User service binary.

use std::sync::Arc;

use anyhow::Context;
use auth_relay::{RelayMetrics, TokenRelayClient};
use prometheus::Registry;
use rust_common::{init_tracing, wait_for_signal, ShutdownCoordinator, TracingConfig};
use tracing::{error, info};
use user_service::catalog::ProductCatalogClient;
use user_service::profiles::InMemoryProfileStore;
use user_service::{http, Config, ProfileService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("user-service")
            .with_log_level(&config.log_level)
            .with_json_output(config.log_json),
    )
    .context("initializing tracing")?;

    let registry = Registry::new();
    let relay_metrics = RelayMetrics::new(&registry).context("registering relay metrics")?;
    let relay = Arc::new(TokenRelayClient::new(config.relay.clone(), relay_metrics));
    relay.open().context("opening auth relay channel")?;

    let catalog = Arc::new(ProductCatalogClient::new(config.catalog.clone()));
    catalog.open().context("opening product channel")?;

    let service = Arc::new(ProfileService::new(
        Arc::new(InMemoryProfileStore::new()),
        catalog.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;

    let mut coordinator = ShutdownCoordinator::new();

    let app = http::router(service, relay.clone(), registry);
    let http_shutdown = coordinator.subscribe();
    coordinator.spawn("http", async move {
        info!(addr = ?listener.local_addr().ok(), "HTTP server listening");
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(http_shutdown.recv())
            .await
        {
            error!(error = %e, "HTTP server failed");
        }
    });

    tokio::select! {
        () = wait_for_signal() => {}
        () = coordinator.wait_any() => {}
    }

    if !coordinator.shutdown(config.shutdown_timeout).await {
        error!("shutdown timed out");
    }
    catalog.close();
    relay.close();
    info!("user service stopped");
    Ok(())
}
