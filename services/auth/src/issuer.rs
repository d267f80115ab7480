//! Token issuer: mints and verifies access and refresh credentials.
//!
//! Each kind has its own HS256 key and lifetime, and carries its kind in the
//! `token_type` claim, so a refresh credential fails access verification on
//! both the signature and the claim check.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_relay::CredentialResolver;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header};
use rust_common::{Identity, VerificationOutcome};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;

use crate::config::TokenSettings;
use crate::error::AuthError;
use crate::jwt::{Claims, Clock, Token, TokenKind};
use crate::metrics::AuthMetrics;

struct KeyDomain {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyDomain {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Access and refresh credentials returned by login, register and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    /// Bearer credential for resource services
    pub access_token: String,
    /// Credential for `/auth/refresh`
    pub refresh_token: String,
    /// Always `Bearer`
    pub token_type: &'static str,
    /// Access credential lifetime in seconds
    pub expires_in: u64,
}

/// Mints and verifies credentials.
pub struct TokenIssuer {
    access: KeyDomain,
    refresh: KeyDomain,
    issuer: String,
    clock: Arc<dyn Clock>,
    metrics: AuthMetrics,
}

impl TokenIssuer {
    /// Builds an issuer from validated settings.
    pub fn new(settings: &TokenSettings, clock: Arc<dyn Clock>, metrics: AuthMetrics) -> Self {
        Self {
            access: KeyDomain::new(settings.access_secret.expose_secret(), settings.access_ttl),
            refresh: KeyDomain::new(settings.refresh_secret.expose_secret(), settings.refresh_ttl),
            issuer: settings.issuer.clone(),
            clock,
            metrics,
        }
    }

    fn domain(&self, kind: TokenKind) -> &KeyDomain {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Mints one credential of `kind` for `identity`.
    pub fn issue(&self, identity: &Identity, kind: TokenKind) -> Result<String, AuthError> {
        let domain = self.domain(kind);
        let claims = Claims::new(identity, kind, &self.issuer, self.clock.now(), domain.ttl);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &domain.encoding)?;

        self.metrics.record_issued(kind);
        debug!(
            user_id = identity.user_id(),
            token_type = %kind,
            jti = %claims.jti,
            "credential issued"
        );
        Ok(token)
    }

    /// Mints an access/refresh pair.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.issue(identity, TokenKind::Access)?,
            refresh_token: self.issue(identity, TokenKind::Refresh)?,
            token_type: "Bearer",
            expires_in: self.access.ttl.as_secs(),
        })
    }

    /// Verifies `credential` as a `kind` credential. Fails closed.
    pub fn verify(&self, credential: &str, kind: TokenKind) -> VerificationOutcome {
        let result = Token::parse(credential)
            .and_then(|token| token.verify_signature(&self.domain(kind).decoding))
            .and_then(|token| token.verify_claims(kind, &self.issuer, self.clock.now()))
            .and_then(|token| token.identity());

        let outcome = match result {
            Ok(identity) => VerificationOutcome::Valid(identity),
            Err(reason) => {
                debug!(token_type = %kind, reason = reason.as_str(), "credential refused");
                VerificationOutcome::Invalid(reason)
            }
        };

        self.metrics.record_validation(kind, &outcome);
        outcome
    }

    /// Verifies an access credential.
    pub fn verify_access(&self, credential: &str) -> VerificationOutcome {
        self.verify(credential, TokenKind::Access)
    }

    /// Verifies a refresh credential.
    pub fn verify_refresh(&self, credential: &str) -> VerificationOutcome {
        self.verify(credential, TokenKind::Refresh)
    }
}

/// Local resolution for the service's own gated routes.
#[async_trait]
impl CredentialResolver for TokenIssuer {
    async fn resolve(&self, credential: &str) -> VerificationOutcome {
        self.verify_access(credential)
    }
}
