//! HTTP authentication gate.
//!
//! Per request: no bearer credential is a 401 without touching the resolver;
//! otherwise exactly one `resolve` call decides between running the handler
//! with an [`Identity`] extension, 403, and 503.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use futures::FutureExt;
use rust_common::{Identity, UnavailableCause, VerificationOutcome};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::GateRejection;
use crate::resolver::CredentialResolver;

/// Shared state for [`authenticate`].
#[derive(Clone)]
pub struct GateState {
    resolver: Arc<dyn CredentialResolver>,
}

impl GateState {
    /// Gate backed by `resolver`.
    pub fn new(resolver: Arc<dyn CredentialResolver>) -> Self {
        Self { resolver }
    }
}

/// Authentication middleware, mounted with `axum::middleware::from_fn_with_state`.
///
/// On success the handler can take `Extension<Identity>`.
pub async fn authenticate(
    State(state): State<GateState>,
    mut req: Request,
    next: Next,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let Some(credential) = extract_bearer(req.headers()).map(str::to_owned) else {
        return reject(GateRejection::NoToken, correlation_id, req.uri().path());
    };

    let resolver = Arc::clone(&state.resolver);
    let outcome = AssertUnwindSafe(async move { resolver.resolve(&credential).await })
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            error!(%correlation_id, "credential resolver panicked");
            VerificationOutcome::ServiceUnavailable(UnavailableCause::InternalFault)
        });

    match outcome {
        VerificationOutcome::Valid(identity) => {
            debug!(%correlation_id, user_id = identity.user_id(), "request authenticated");
            req.extensions_mut().insert::<Identity>(identity);
            next.run(req).await
        }
        VerificationOutcome::Invalid(reason) => reject(
            GateRejection::Invalid(reason),
            correlation_id,
            req.uri().path(),
        ),
        VerificationOutcome::ServiceUnavailable(cause) => reject(
            GateRejection::Unavailable(cause),
            correlation_id,
            req.uri().path(),
        ),
    }
}

fn reject(rejection: GateRejection, correlation_id: Uuid, path: &str) -> Response {
    let code = rejection.code().as_str();
    match rejection {
        GateRejection::NoToken => {
            debug!(%correlation_id, path, code, "request without bearer credential");
        }
        GateRejection::Invalid(reason) => {
            warn!(%correlation_id, path, code, reason = reason.as_str(), "credential rejected");
        }
        GateRejection::Unavailable(cause) => error!(
            %correlation_id,
            path,
            code,
            cause = cause.as_str(),
            grpc_code = ?cause.grpc_code(),
            "credential could not be verified"
        ),
    }
    rejection.to_response(correlation_id)
}

/// Extracts the credential from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
