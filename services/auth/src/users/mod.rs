//! User store seam and its in-memory implementation.

mod memory;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_common::{Identity, IdentityError, PlatformError};
use serde::Serialize;

pub use memory::InMemoryUserDirectory;

/// A stored user, including the password hash.
#[derive(Clone)]
pub struct UserRecord {
    /// Opaque id, used as `sub`
    pub id: String,
    /// Lowercased email, unique
    pub email: String,
    /// Display name
    pub username: String,
    /// argon2 PHC string
    pub password_hash: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

impl UserRecord {
    /// The identity carried in credentials for this user.
    pub fn identity(&self) -> Result<Identity, IdentityError> {
        Identity::new(self.id.clone(), self.email.clone(), self.username.clone())
    }
}

/// Public view of a user; never includes the hash.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    /// User id
    pub id: String,
    /// Email
    pub email: String,
    /// Display name
    pub username: String,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserView {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            email: record.email.clone(),
            username: record.username.clone(),
            created_at: record.created_at,
        }
    }
}

/// Fields needed to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Lowercased email
    pub email: String,
    /// Display name
    pub username: String,
    /// argon2 PHC string
    pub password_hash: String,
}

/// User persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Creates a user; `PlatformError::Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord, PlatformError>;

    /// Looks a user up by id.
    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, PlatformError>;

    /// Looks a user up by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, PlatformError>;
}
