use std::fmt;
use std::time::Duration;

use rust_common::{Identity, IdentityError};
use serde::{Deserialize, Serialize};

/// Which key domain a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, accepted by resource services
    Access,
    /// Long-lived, accepted only by `/auth/refresh`
    Refresh,
}

impl TokenKind {
    /// Claim value and metric label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire claims of an issued credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Claims {
    // Identity
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,

    // Key domain
    pub token_type: TokenKind,

    // Registered claims
    pub iss: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    /// Claims for `identity`, valid from `now` for `ttl`.
    #[must_use]
    pub fn new(
        identity: &Identity,
        kind: TokenKind,
        issuer: &str,
        now: i64,
        ttl: Duration,
    ) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Claims {
            sub: identity.user_id().to_string(),
            email: identity.email().to_string(),
            username: identity.username().to_string(),
            token_type: kind,
            iss: issuer.to_string(),
            iat: now,
            nbf: now,
            exp: now.saturating_add(ttl),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Valid in `[nbf, exp)`.
    #[must_use]
    pub fn is_valid_at(&self, timestamp: i64) -> bool {
        self.nbf <= timestamp && timestamp < self.exp
    }

    /// The identity carried by the claims, if complete.
    pub fn identity(&self) -> Result<Identity, IdentityError> {
        Identity::new(self.sub.clone(), self.email.clone(), self.username.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::new("u1", "alice@example.com", "alice").unwrap()
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new(&alice(), TokenKind::Access, "auth", 1_000, Duration::from_secs(900));

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp, 1_900);
        assert_eq!(claims.identity().unwrap(), alice());
    }

    #[test]
    fn test_validity_window_is_half_open() {
        let claims = Claims::new(&alice(), TokenKind::Access, "auth", 1_000, Duration::from_secs(10));
        assert!(!claims.is_valid_at(999));
        assert!(claims.is_valid_at(1_000));
        assert!(claims.is_valid_at(1_009));
        assert!(!claims.is_valid_at(1_010));
    }

    #[test]
    fn test_token_type_serializes_lowercase() {
        let claims = Claims::new(&alice(), TokenKind::Refresh, "auth", 0, Duration::from_secs(1));
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["token_type"], "refresh");
    }

    #[test]
    fn test_missing_identity_fields_default_to_empty() {
        let json = r#"{"sub":"u1","token_type":"access","iss":"auth","iat":0,"nbf":0,"exp":10,"jti":"j"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(claims.identity().is_err());
    }
}
