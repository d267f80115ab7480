//! Verified caller identity and the outcome of resolving a credential.
//!
//! `VerificationOutcome` keeps three cases apart: a valid identity, a bad
//! credential, and an issuer that could not be asked. Only the last one is
//! worth retrying or alerting on.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tonic::Code;

/// Error returned when an identity would be partially populated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("identity field `{field}` is empty")]
pub struct IdentityError {
    /// Name of the first empty field
    pub field: &'static str,
}

/// The verified subject of a credential.
///
/// Fields are private so an `Identity` can only be built through
/// [`Identity::new`], which rejects empty values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    user_id: String,
    email: String,
    username: String,
}

impl Identity {
    /// Builds an identity; every field must be non-empty.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let identity = Self {
            user_id: user_id.into(),
            email: email.into(),
            username: username.into(),
        };

        for (field, value) in [
            ("user_id", &identity.user_id),
            ("email", &identity.email),
            ("username", &identity.username),
        ] {
            if value.trim().is_empty() {
                return Err(IdentityError { field });
            }
        }

        Ok(identity)
    }

    /// Subject identifier.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Why a credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Not a structurally valid token
    Malformed,
    /// Signature does not match the expected key
    BadSignature,
    /// Expiry is in the past
    Expired,
    /// `nbf` is in the future
    NotYetValid,
    /// Access credential presented as refresh, or the reverse
    WrongTokenType,
    /// Issued by someone else
    UntrustedIssuer,
    /// Claims do not carry a complete identity
    IncompleteIdentity,
    /// The issuer answered `valid = false`
    Rejected,
}

impl InvalidReason {
    /// Machine-readable name, used as a metric label and log field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Malformed => "malformed",
            Self::BadSignature => "bad_signature",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::WrongTokenType => "wrong_token_type",
            Self::UntrustedIssuer => "untrusted_issuer",
            Self::IncompleteIdentity => "incomplete_identity",
            Self::Rejected => "rejected",
        }
    }

    /// Short human-readable message, safe to send to callers.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Expired => "Token has expired",
            Self::NotYetValid => "Token is not yet valid",
            Self::WrongTokenType => "Token type not accepted here",
            _ => "Invalid or expired token",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the issuer could not be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableCause {
    /// The relay channel was never opened, or already closed
    NotInitialized,
    /// The call outran its deadline
    DeadlineExceeded,
    /// The RPC failed with a non-OK status
    Transport(Code),
    /// Anything unexpected inside the resolver
    InternalFault,
}

impl UnavailableCause {
    /// Machine-readable name, used as a metric label and log field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Transport(_) => "transport",
            Self::InternalFault => "internal_fault",
        }
    }

    /// The downstream gRPC code, if one was observed.
    #[must_use]
    pub const fn grpc_code(&self) -> Option<Code> {
        match self {
            Self::Transport(code) => Some(*code),
            Self::DeadlineExceeded => Some(Code::DeadlineExceeded),
            Self::NotInitialized | Self::InternalFault => None,
        }
    }
}

impl fmt::Display for UnavailableCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(code) => write!(f, "transport ({code:?})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of resolving a credential into an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The credential is currently valid for this identity
    Valid(Identity),
    /// The credential is bad; the caller must obtain a new one
    Invalid(InvalidReason),
    /// The issuer could not be reached; operator action may be needed
    ServiceUnavailable(UnavailableCause),
}

impl VerificationOutcome {
    /// Label for metrics and logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Valid(_) => "valid",
            Self::Invalid(_) => "invalid",
            Self::ServiceUnavailable(_) => "unavailable",
        }
    }

    /// Only unavailability is transient.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable(_))
    }

    /// The identity, when valid.
    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Valid(identity) => Some(identity),
            _ => None,
        }
    }

    /// Consumes the outcome, keeping only a valid identity.
    #[must_use]
    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Valid(identity) => Some(identity),
            _ => None,
        }
    }
}
