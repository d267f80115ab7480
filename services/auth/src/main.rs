//! Auth service binary: gRPC issuer plus the `/auth` HTTP API.

use std::sync::Arc;

use anyhow::Context;
use auth_service::grpc::AuthGrpcService;
use auth_service::jwt::SystemClock;
use auth_service::metrics::AuthMetrics;
use auth_service::users::InMemoryUserDirectory;
use auth_service::{http, AuthService, Config, TokenIssuer};
use prometheus::Registry;
use rust_common::{init_tracing, wait_for_signal, ShutdownCoordinator, TracingConfig};
use tonic::transport::Server;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    init_tracing(
        &TracingConfig::default()
            .with_service_name("auth-service")
            .with_log_level(&config.log_level)
            .with_json_output(config.log_json),
    )
    .context("initializing tracing")?;

    let registry = Registry::new();
    let metrics = AuthMetrics::new(&registry).context("registering metrics")?;
    let issuer = Arc::new(TokenIssuer::new(&config.tokens, Arc::new(SystemClock), metrics));
    let users = Arc::new(InMemoryUserDirectory::new());
    let service = Arc::new(AuthService::new(users, issuer));

    let grpc_addr = config.grpc_addr().parse().context("parsing gRPC address")?;
    let http_listener = tokio::net::TcpListener::bind(config.http_addr())
        .await
        .with_context(|| format!("binding {}", config.http_addr()))?;

    let mut coordinator = ShutdownCoordinator::new();

    let grpc_service = AuthGrpcService::new(Arc::clone(&service)).into_server();
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

    let app = http::router(service, registry);
    let http_shutdown = coordinator.subscribe();
    coordinator.spawn("http", async move {
        info!(addr = ?http_listener.local_addr().ok(), "HTTP server listening");
        if let Err(e) = axum::serve(http_listener, app)
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
    info!("auth service stopped");
    Ok(())
}
