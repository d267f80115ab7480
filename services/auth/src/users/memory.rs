use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_common::PlatformError;
use uuid::Uuid;

use super::{NewUser, UserDirectory, UserRecord};

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, UserRecord>,
    id_by_email: HashMap<String, String>,
}

/// Process-local user store.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    inner: RwLock<Inner>,
}

impl InMemoryUserDirectory {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn create(&self, user: NewUser) -> Result<UserRecord, PlatformError> {
        let mut inner = self.inner.write();
        if inner.id_by_email.contains_key(&user.email) {
            return Err(PlatformError::conflict("email already registered"));
        }

        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        inner
            .id_by_email
            .insert(record.email.clone(), record.id.clone());
        inner.by_id.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, PlatformError> {
        Ok(self.inner.read().by_id.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, PlatformError> {
        let inner = self.inner.read();
        Ok(inner
            .id_by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }
}
