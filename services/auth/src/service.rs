//! Registration, login, refresh and user lookups.

use std::sync::Arc;

use rust_common::{Identity, PlatformError, VerificationOutcome};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::error::AuthError;
use crate::issuer::{TokenIssuer, TokenPair};
use crate::password::{hash_password_blocking, verify_password_blocking, UNMATCHABLE_HASH};
use crate::users::{NewUser, UserDirectory, UserRecord, UserView};

/// `POST /auth/register` body.
#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Display name, 3 to 30 characters
    #[validate(length(min = 3, max = 30))]
    pub username: String,
    /// Plain password, at least 6 characters
    #[validate(length(min = 6))]
    pub password: String,
}

/// `POST /auth/login` body.
#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email)]
    pub email: String,
    /// Plain password
    #[validate(length(min = 1))]
    pub password: String,
}

/// `POST /auth/refresh` body.
#[derive(Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh credential
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// User plus a fresh credential pair.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: UserView,
    /// Issued credentials
    #[serde(flatten)]
    pub tokens: TokenPair,
}

/// Auth use cases over a user store and a token issuer.
pub struct AuthService {
    users: Arc<dyn UserDirectory>,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    /// Creates the service.
    pub fn new(users: Arc<dyn UserDirectory>, issuer: Arc<TokenIssuer>) -> Self {
        Self { users, issuer }
    }

    /// The issuer backing this service.
    #[must_use]
    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// Registers a user and signs them in.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let request = RegisterRequest {
            email: normalize_email(&request.email),
            username: request.username.trim().to_string(),
            password: request.password,
        };
        request.validate().map_err(validation_error)?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = hash_password_blocking(request.password).await?;
        let record = self
            .users
            .create(NewUser {
                email: request.email,
                username: request.username,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                PlatformError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %record.id, "user registered");
        self.respond(&record)
    }

    /// Checks email and password and issues a pair.
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let request = LoginRequest {
            email: normalize_email(&request.email),
            password: request.password,
        };
        request.validate().map_err(validation_error)?;

        let Some(record) = self.users.find_by_email(&request.email).await? else {
            let _ = verify_password_blocking(request.password, UNMATCHABLE_HASH.to_string()).await;
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password_blocking(request.password, record.password_hash.clone()).await? {
            warn!(user_id = %record.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %record.id, "user logged in");
        self.respond(&record)
    }

    /// Exchanges a refresh credential for a new pair.
    ///
    /// The subject must still exist; claims are re-read from the store.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<AuthResponse, AuthError> {
        request.validate().map_err(validation_error)?;

        let identity = match self.issuer.verify_refresh(request.refresh_token.trim()) {
            VerificationOutcome::Valid(identity) => identity,
            _ => return Err(AuthError::InvalidRefreshToken),
        };

        let Some(record) = self.users.find_by_id(identity.user_id()).await? else {
            warn!(user_id = identity.user_id(), "refresh for a user that no longer exists");
            return Err(AuthError::InvalidRefreshToken);
        };

        self.respond(&record)
    }

    /// The stored user behind a verified identity.
    pub async fn me(&self, identity: &Identity) -> Result<UserView, AuthError> {
        let record = self.user_by_id(identity.user_id()).await?;
        Ok(UserView::from(&record))
    }

    /// Looks up a user by id.
    pub async fn user_by_id(&self, user_id: &str) -> Result<UserRecord, AuthError> {
        if user_id.trim().is_empty() {
            return Err(AuthError::Validation("User ID is required".to_string()));
        }
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Whether a user with this id exists.
    pub async fn user_exists(&self, user_id: &str) -> Result<bool, AuthError> {
        if user_id.trim().is_empty() {
            return Err(AuthError::Validation("User ID is required".to_string()));
        }
        Ok(self.users.find_by_id(user_id).await?.is_some())
    }

    fn respond(&self, record: &UserRecord) -> Result<AuthResponse, AuthError> {
        let identity = record
            .identity()
            .map_err(|e| AuthError::Internal(format!("stored user is incomplete: {e}")))?;
        Ok(AuthResponse {
            user: UserView::from(record),
            tokens: self.issuer.issue_pair(&identity)?,
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validation_error(errors: ValidationErrors) -> AuthError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| field.to_string())
        .collect();
    fields.sort();
    AuthError::Validation(format!("invalid fields: {}", fields.join(", ")))
}
