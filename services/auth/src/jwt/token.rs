//! Type-state JWT verification.
//!
//! `Token<Unverified>` → `Token<SignatureVerified>` → `Token<Verified>`.
//! Claims are only reachable once both the signature and the claim checks
//! have passed, and every failure is an [`InvalidReason`].

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Header, Validation};
use rust_common::{Identity, InvalidReason};

use crate::jwt::claims::{Claims, TokenKind};

/// Upper bound on credential length; anything longer is malformed.
pub const MAX_CREDENTIAL_LEN: usize = 8 * 1024;

mod private {
    pub trait Sealed {}
}

/// Marker trait for token verification states
pub trait TokenState: private::Sealed {
    /// Human-readable state name for debugging
    fn state_name() -> &'static str;
}

/// Parsed header only
#[derive(Debug)]
pub struct Unverified;

/// Signature checked against the key domain
#[derive(Debug)]
pub struct SignatureVerified(Claims);

/// Signature and claims checked
#[derive(Debug)]
pub struct Verified(Claims);

impl private::Sealed for Unverified {}
impl private::Sealed for SignatureVerified {}
impl private::Sealed for Verified {}

impl TokenState for Unverified {
    fn state_name() -> &'static str {
        "Unverified"
    }
}

impl TokenState for SignatureVerified {
    fn state_name() -> &'static str {
        "SignatureVerified"
    }
}

impl TokenState for Verified {
    fn state_name() -> &'static str {
        "Verified"
    }
}

/// Type-state token wrapper
#[derive(Debug)]
pub struct Token<S: TokenState> {
    raw: String,
    header: Header,
    state: S,
}

impl<S: TokenState> Token<S> {
    /// Name of the current state.
    #[must_use]
    pub fn state(&self) -> &'static str {
        S::state_name()
    }
}

impl Token<Unverified> {
    /// Parses the header. Only HS256 is accepted.
    pub fn parse(raw: &str) -> Result<Self, InvalidReason> {
        if raw.is_empty() || raw.len() > MAX_CREDENTIAL_LEN {
            return Err(InvalidReason::Malformed);
        }

        let header = decode_header(raw).map_err(|_| InvalidReason::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(InvalidReason::BadSignature);
        }

        Ok(Token {
            raw: raw.to_string(),
            header,
            state: Unverified,
        })
    }

    /// Checks the signature only; time and type claims are checked next.
    pub fn verify_signature(
        self,
        key: &DecodingKey,
    ) -> Result<Token<SignatureVerified>, InvalidReason> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(&self.raw, key, &validation).map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                InvalidReason::BadSignature
            }
            _ => InvalidReason::Malformed,
        })?;

        Ok(Token {
            raw: self.raw,
            header: self.header,
            state: SignatureVerified(data.claims),
        })
    }
}

impl Token<SignatureVerified> {
    /// Checks key domain, issuer and the `[nbf, exp)` window at `now`.
    pub fn verify_claims(
        self,
        expected: TokenKind,
        issuer: &str,
        now: i64,
    ) -> Result<Token<Verified>, InvalidReason> {
        let claims = self.state.0;

        if claims.token_type != expected {
            return Err(InvalidReason::WrongTokenType);
        }
        if claims.iss != issuer {
            return Err(InvalidReason::UntrustedIssuer);
        }
        if !claims.is_valid_at(now) {
            return Err(if now < claims.nbf {
                InvalidReason::NotYetValid
            } else {
                InvalidReason::Expired
            });
        }

        Ok(Token {
            raw: self.raw,
            header: self.header,
            state: Verified(claims),
        })
    }
}

impl Token<Verified> {
    /// Access claims - only available on fully verified tokens
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.state.0
    }

    /// The complete identity, or `IncompleteIdentity`.
    pub fn identity(&self) -> Result<Identity, InvalidReason> {
        self.claims()
            .identity()
            .map_err(|_| InvalidReason::IncompleteIdentity)
    }
}
