//! `auth.v1.AuthService` server.
//!
//! Verification failures are answered with `valid = false`, never with a
//! failed RPC; a non-OK status means the issuer itself is in trouble.

use std::sync::Arc;

use rust_common::proto::auth::v1::auth_service_server::{self, AuthServiceServer};
use rust_common::proto::auth::v1::{
    GetUserByIdRequest, GetUserByIdResponse, ValidateTokenRequest, ValidateTokenResponse,
    VerifyUserExistsRequest, VerifyUserExistsResponse,
};
use rust_common::VerificationOutcome;
use tonic::{Request, Response, Status};
use tracing::instrument;

use crate::error::AuthError;
use crate::service::AuthService;

/// gRPC front of the auth service.
#[derive(Clone)]
pub struct AuthGrpcService {
    service: Arc<AuthService>,
}

impl AuthGrpcService {
    /// Wraps the service.
    pub fn new(service: Arc<AuthService>) -> Self {
        Self { service }
    }

    /// Tonic server for this service.
    #[must_use]
    pub fn into_server(self) -> AuthServiceServer<Self> {
        AuthServiceServer::new(self)
    }
}

fn invalid(error: &str) -> ValidateTokenResponse {
    ValidateTokenResponse {
        valid: false,
        error: error.to_string(),
        ..Default::default()
    }
}

#[tonic::async_trait]
impl auth_service_server::AuthService for AuthGrpcService {
    #[instrument(skip_all, fields(method = "ValidateToken"))]
    async fn validate_token(
        &self,
        request: Request<ValidateTokenRequest>,
    ) -> Result<Response<ValidateTokenResponse>, Status> {
        let token = request.into_inner().token;
        let token = token.trim();
        if token.is_empty() {
            return Ok(Response::new(invalid("Token is required")));
        }

        let response = match self.service.issuer().verify_access(token) {
            VerificationOutcome::Valid(identity) => ValidateTokenResponse {
                valid: true,
                user_id: identity.user_id().to_string(),
                email: identity.email().to_string(),
                username: identity.username().to_string(),
                error: String::new(),
            },
            VerificationOutcome::Invalid(reason) => invalid(reason.message()),
            VerificationOutcome::ServiceUnavailable(cause) => {
                return Err(Status::unavailable(cause.as_str()));
            }
        };

        Ok(Response::new(response))
    }

    #[instrument(skip_all, fields(method = "GetUserById"))]
    async fn get_user_by_id(
        &self,
        request: Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        let user_id = request.into_inner().user_id;

        let response = match self.service.user_by_id(&user_id).await {
            Ok(user) => GetUserByIdResponse {
                success: true,
                id: user.id,
                email: user.email,
                username: user.username,
                error: String::new(),
            },
            Err(err @ (AuthError::Validation(_) | AuthError::UserNotFound)) => GetUserByIdResponse {
                success: false,
                error: err.public_message(),
                ..Default::default()
            },
            Err(err) => return Err(err.into()),
        };

        Ok(Response::new(response))
    }

    #[instrument(skip_all, fields(method = "VerifyUserExists"))]
    async fn verify_user_exists(
        &self,
        request: Request<VerifyUserExistsRequest>,
    ) -> Result<Response<VerifyUserExistsResponse>, Status> {
        let user_id = request.into_inner().user_id;

        let response = match self.service.user_exists(&user_id).await {
            Ok(exists) => VerifyUserExistsResponse {
                exists,
                error: String::new(),
            },
            Err(AuthError::Validation(msg)) => VerifyUserExistsResponse {
                exists: false,
                error: msg,
            },
            Err(AuthError::Store(e)) => {
                tracing::error!(error = %e, "user store failed");
                return Err(Status::internal("internal error"));
            }
            Err(err) => return Err(err.into()),
        };

        Ok(Response::new(response))
    }
}
