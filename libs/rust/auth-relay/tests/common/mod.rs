//! In-process `auth.v1.AuthService` used by the relay tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use auth_relay::{RelayConfig, RelayMetrics, TokenRelayClient};
use rust_common::proto::auth::v1::auth_service_server::{AuthService, AuthServiceServer};
use rust_common::proto::auth::v1::{
    GetUserByIdRequest, GetUserByIdResponse, ValidateTokenRequest, ValidateTokenResponse,
    VerifyUserExistsRequest, VerifyUserExistsResponse,
};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Code, Request, Response, Status};
use url::Url;

/// How the fake issuer answers `ValidateToken`.
#[derive(Clone)]
pub enum Behaviour {
    /// `valid=true` with an identity derived from the token (`tok-<id>`)
    Echo,
    /// Always this response
    Answer(ValidateTokenResponse),
    /// Echo, after sleeping
    Delay(Duration),
    /// Fail the RPC with this code
    Fail(Code),
}

#[derive(Clone)]
pub struct FakeIssuer {
    behaviour: Behaviour,
    calls: Arc<AtomicUsize>,
}

impl FakeIssuer {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

pub fn echo(token: &str) -> ValidateTokenResponse {
    let id = token.trim_start_matches("tok-");
    ValidateTokenResponse {
        valid: true,
        user_id: id.to_string(),
        email: format!("{id}@example.com"),
        username: id.to_string(),
        error: String::new(),
    }
}

pub fn rejected() -> ValidateTokenResponse {
    ValidateTokenResponse {
        valid: false,
        error: "Invalid or expired token".to_string(),
        ..Default::default()
    }
}

#[tonic::async_trait]
impl AuthService for FakeIssuer {
    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let token = request.into_inner().token;
        match &self.behaviour {
            Behaviour::Echo => Ok(Response::new(echo(&token))),
            Behaviour::Answer(response) => Ok(Response::new(response.clone())),
            Behaviour::Delay(delay) => {
                tokio::time::sleep(*delay).await;
                Ok(Response::new(echo(&token)))
            }
            Behaviour::Fail(code) => Err(Status::new(*code, "issuer failure detail")),
        }
    }

    async fn get_user_by_id(
        &self,
        _request: Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        Err(Status::unimplemented("get_user_by_id"))
    }

    async fn verify_user_exists(
        &self,
        _request: Request<VerifyUserExistsRequest>,
    ) -> Result<Response<VerifyUserExistsResponse>, Status> {
        Err(Status::unimplemented("verify_user_exists"))
    }
}

/// Serves `issuer` on an ephemeral port.
pub async fn spawn_issuer(issuer: FakeIssuer) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind gRPC port");
    let addr = listener.local_addr().unwrap();
    let incoming = TcpListenerStream::new(listener);

    tokio::spawn(async move {
        Server::builder()
            .add_service(AuthServiceServer::new(issuer))
            .serve_with_incoming(incoming)
            .await
            .expect("start fake issuer");
    });

    addr
}

/// An address nothing listens on.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn relay_config(addr: SocketAddr, deadline: Duration) -> RelayConfig {
    RelayConfig::new(Url::parse(&format!("http://{addr}")).unwrap())
        .with_deadline(deadline)
        .with_connect_timeout(Duration::from_millis(500))
}

/// An opened relay with detached metrics.
pub fn open_relay(addr: SocketAddr, deadline: Duration) -> TokenRelayClient {
    let relay = TokenRelayClient::new(
        relay_config(addr, deadline),
        RelayMetrics::detached().unwrap(),
    );
    relay.open().unwrap();
    relay
}
