//! Product service binary: gated HTTP API plus the `product.v1` gRPC server.

use std::sync::Arc;

use anyhow::Context;
use auth_relay::{RelayMetrics, TokenRelayClient};
use prometheus::Registry;
use product_service::catalog::{InMemoryCatalog, InMemoryPurchaseLedger};
use product_service::grpc::ProductGrpcService;
use product_service::{http, Config, ProductService};
use rust_common::{init_tracing, wait_for_signal, ShutdownCoordinator, TracingConfig};
use tonic::transport::Server;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("product-service")
            .with_log_level(&config.log_level)
            .with_json_output(config.log_json),
    )
    .context("initializing tracing")?;

    let registry = Registry::new();
    let relay_metrics = RelayMetrics::new(&registry).context("registering relay metrics")?;
    let relay = Arc::new(TokenRelayClient::new(config.relay.clone(), relay_metrics));
    relay.open().context("opening auth relay channel")?;

    let service = Arc::new(ProductService::new(
        Arc::new(InMemoryCatalog::seeded()),
        Arc::new(InMemoryPurchaseLedger::new()),
    ));

    let grpc_addr = config.grpc_addr().parse().context("parsing gRPC address")?;
    let listener = tokio::net::TcpListener::bind(config.addr())
        .await
        .with_context(|| format!("binding {}", config.addr()))?;

    let mut coordinator = ShutdownCoordinator::new();

    let grpc_service = ProductGrpcService::new(Arc::clone(&service)).into_server();
    let grpc_shutdown = coordinator.subscribe();
    coordinator.spawn("grpc", async move {
        info!(addr = %grpc_addr, "gRPC server listening");
        if let Err(e) = Server::builder()
            .add_service(grpc_service)
            .serve_with_shutdown(grpc_addr, grpc_shutdown.recv())
            .await
        {
            error!(error = %e, "gRPC server failed");
        }
    });

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
    relay.close();
    info!("product service stopped");
    Ok(())
}
