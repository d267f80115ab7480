//! Profile records and the store seam behind them.

mod memory;

pub use memory::InMemoryProfileStore;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_common::PlatformError;
use serde::{Deserialize, Serialize};

/// Postal address. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number
    pub street: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or region
    pub state: Option<String>,
    /// Postal code
    pub zip_code: Option<String>,
    /// Country
    pub country: Option<String>,
}

/// UI colour scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light scheme
    #[default]
    Light,
    /// Dark scheme
    Dark,
}

impl Theme {
    /// Parses `light` or `dark`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

/// Per-user settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Colour scheme
    pub theme: Theme,
    /// Language tag
    pub language: String,
    /// Whether notifications are enabled
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: "en".to_string(),
            notifications: true,
        }
    }
}

/// A user's profile, keyed by the verified user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Owner, taken from the verified identity
    pub user_id: String,
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Phone number, free-form
    pub phone_number: Option<String>,
    /// Date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// Postal address
    pub address: Address,
    /// Short biography
    pub bio: Option<String>,
    /// Avatar image URL
    pub avatar: Option<String>,
    /// Settings
    pub preferences: Preferences,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
    /// When the profile last changed
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// An empty profile for `user_id` with default preferences.
    #[must_use]
    pub fn empty(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            first_name: None,
            last_name: None,
            phone_number: None,
            date_of_birth: None,
            address: Address::default(),
            bio: None,
            avatar: None,
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Profile persistence, one profile per user id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The profile of `user_id`, if any.
    async fn find(&self, user_id: &str) -> Result<Option<UserProfile>, PlatformError>;

    /// Stores a new profile. `Conflict` if `user_id` already has one.
    async fn create(&self, profile: UserProfile) -> Result<UserProfile, PlatformError>;

    /// Replaces an existing profile. `NotFound` if there is none.
    async fn update(&self, profile: UserProfile) -> Result<UserProfile, PlatformError>;

    /// Removes the profile of `user_id`. Returns whether one existed.
    async fn delete(&self, user_id: &str) -> Result<bool, PlatformError>;
}
