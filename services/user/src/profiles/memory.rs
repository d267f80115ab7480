use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_common::PlatformError;

use super::{ProfileStore, UserProfile};

/// Process-local profile store.
#[derive(Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
}

impl InMemoryProfileStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn find(&self, user_id: &str) -> Result<Option<UserProfile>, PlatformError> {
        Ok(self.profiles.read().get(user_id).cloned())
    }

    async fn create(&self, profile: UserProfile) -> Result<UserProfile, PlatformError> {
        match self.profiles.write().entry(profile.user_id.clone()) {
            Entry::Occupied(_) => Err(PlatformError::conflict("profile already exists")),
            Entry::Vacant(slot) => Ok(slot.insert(profile).clone()),
        }
    }

    async fn update(&self, profile: UserProfile) -> Result<UserProfile, PlatformError> {
        match self.profiles.write().get_mut(&profile.user_id) {
            Some(stored) => {
                *stored = profile.clone();
                Ok(profile)
            }
            None => Err(PlatformError::NotFound("profile".to_string())),
        }
    }

    async fn delete(&self, user_id: &str) -> Result<bool, PlatformError> {
        Ok(self.profiles.write().remove(user_id).is_some())
    }
}
