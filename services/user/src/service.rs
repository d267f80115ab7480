//! Profile use cases for a verified identity, and catalogue reads.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_common::{Identity, PlatformError};
use serde::Deserialize;
use tracing::info;
use url::Url;
use validator::Validate;

use crate::catalog::{Product, ProductCatalog};
use crate::error::UserError;
use crate::profiles::{ProfileStore, Theme, UserProfile};

/// Address fields of a profile body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct AddressInput {
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

/// Preference fields of a profile body. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesInput {
    /// `light` or `dark`
    pub theme: Option<String>,
    /// Language tag
    pub language: Option<String>,
    /// Notifications on or off
    pub notifications: Option<bool>,
}

/// Body of `POST`, `PUT` and `PATCH /user/profile`.
///
/// Strings are trimmed before validation. Absent fields are left unchanged;
/// the owner always comes from the verified identity.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ProfileInput {
    /// Given name, at most 50 characters
    #[validate(length(max = 50))]
    pub first_name: Option<String>,
    /// Family name, at most 50 characters
    #[validate(length(max = 50))]
    pub last_name: Option<String>,
    /// Phone number
    pub phone_number: Option<String>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub date_of_birth: Option<String>,
    /// Biography, at most 500 characters
    #[validate(length(max = 500))]
    pub bio: Option<String>,
    /// `http(s)` URL; empty clears it
    pub avatar: Option<String>,
    /// Address parts
    pub address: Option<AddressInput>,
    /// Preferences
    pub preferences: Option<PreferencesInput>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|d| d.date_naive())
        })
}

fn is_web_url(value: &str) -> bool {
    Url::parse(value)
        .is_ok_and(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
}

impl ProfileInput {
    fn trim(self) -> Self {
        Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            phone_number: trimmed(self.phone_number),
            date_of_birth: trimmed(self.date_of_birth),
            bio: trimmed(self.bio),
            avatar: trimmed(self.avatar),
            address: self.address.map(|a| AddressInput {
                street: trimmed(a.street),
                city: trimmed(a.city),
                state: trimmed(a.state),
                zip_code: trimmed(a.zip_code),
                country: trimmed(a.country),
            }),
            preferences: self.preferences.map(|p| PreferencesInput {
                theme: trimmed(p.theme),
                language: trimmed(p.language),
                notifications: p.notifications,
            }),
        }
    }

    /// Validates the body and writes the present fields into `profile`.
    fn apply_to(self, profile: &mut UserProfile) -> Result<(), UserError> {
        let input = self.trim();

        let mut invalid: Vec<String> = match input.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => errors.field_errors().keys().map(|f| f.to_string()).collect(),
        };

        let date_of_birth = match input.date_of_birth.as_deref() {
            Some(raw) => {
                let parsed = parse_date(raw);
                if parsed.is_none() {
                    invalid.push("date_of_birth".to_string());
                }
                parsed
            }
            None => None,
        };
        if input
            .avatar
            .as_deref()
            .is_some_and(|a| !a.is_empty() && !is_web_url(a))
        {
            invalid.push("avatar".to_string());
        }
        let theme = match input.preferences.as_ref().and_then(|p| p.theme.as_deref()) {
            Some(raw) => {
                let parsed = Theme::parse(raw);
                if parsed.is_none() {
                    invalid.push("theme".to_string());
                }
                parsed
            }
            None => None,
        };

        if !invalid.is_empty() {
            invalid.sort();
            return Err(UserError::Validation(format!(
                "invalid fields: {}",
                invalid.join(", ")
            )));
        }

        if input.first_name.is_some() {
            profile.first_name = input.first_name;
        }
        if input.last_name.is_some() {
            profile.last_name = input.last_name;
        }
        if input.phone_number.is_some() {
            profile.phone_number = input.phone_number;
        }
        if date_of_birth.is_some() {
            profile.date_of_birth = date_of_birth;
        }
        if input.bio.is_some() {
            profile.bio = input.bio;
        }
        if let Some(avatar) = input.avatar {
            profile.avatar = (!avatar.is_empty()).then_some(avatar);
        }
        if let Some(address) = input.address {
            let current = &mut profile.address;
            current.street = address.street.or(current.street.take());
            current.city = address.city.or(current.city.take());
            current.state = address.state.or(current.state.take());
            current.zip_code = address.zip_code.or(current.zip_code.take());
            current.country = address.country.or(current.country.take());
        }
        if let Some(preferences) = input.preferences {
            let current = &mut profile.preferences;
            if let Some(theme) = theme {
                current.theme = theme;
            }
            if let Some(language) = preferences.language {
                current.language = language;
            }
            if let Some(notifications) = preferences.notifications {
                current.notifications = notifications;
            }
        }
        Ok(())
    }
}

/// Profile use cases over a profile store, plus catalogue reads.
pub struct ProfileService {
    profiles: Arc<dyn ProfileStore>,
    catalog: Arc<dyn ProductCatalog>,
}

impl ProfileService {
    /// Creates the service.
    pub fn new(profiles: Arc<dyn ProfileStore>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self { profiles, catalog }
    }

    /// The caller's profile.
    pub async fn profile(&self, owner: &Identity) -> Result<UserProfile, UserError> {
        self.profiles
            .find(owner.user_id())
            .await?
            .ok_or(UserError::ProfileNotFound)
    }

    /// The caller's profile, creating an empty one on first use.
    pub async fn profile_or_create(&self, owner: &Identity) -> Result<UserProfile, UserError> {
        if let Some(profile) = self.profiles.find(owner.user_id()).await? {
            return Ok(profile);
        }

        match self
            .profiles
            .create(UserProfile::empty(owner.user_id(), Utc::now()))
            .await
        {
            Ok(profile) => {
                info!(user_id = owner.user_id(), "empty profile created");
                Ok(profile)
            }
            // Lost a race with another first request.
            Err(PlatformError::Conflict(_)) => self.profile(owner).await,
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the caller's profile. `ProfileExists` if there is one.
    pub async fn create(
        &self,
        owner: &Identity,
        input: ProfileInput,
    ) -> Result<UserProfile, UserError> {
        let mut profile = UserProfile::empty(owner.user_id(), Utc::now());
        input.apply_to(&mut profile)?;

        let profile = self.profiles.create(profile).await.map_err(|e| match e {
            PlatformError::Conflict(_) => UserError::ProfileExists,
            other => UserError::Store(other),
        })?;

        info!(user_id = owner.user_id(), "profile created");
        Ok(profile)
    }

    /// Merges `input` into the caller's profile.
    pub async fn update(
        &self,
        owner: &Identity,
        input: ProfileInput,
    ) -> Result<UserProfile, UserError> {
        let mut profile = self.profile(owner).await?;
        input.apply_to(&mut profile)?;
        profile.updated_at = Utc::now();

        let profile = self.profiles.update(profile).await.map_err(|e| match e {
            PlatformError::NotFound(_) => UserError::ProfileNotFound,
            other => UserError::Store(other),
        })?;

        info!(user_id = owner.user_id(), "profile updated");
        Ok(profile)
    }

    /// Deletes the caller's profile.
    pub async fn delete(&self, owner: &Identity) -> Result<(), UserError> {
        if !self.profiles.delete(owner.user_id()).await? {
            return Err(UserError::ProfileNotFound);
        }
        info!(user_id = owner.user_id(), "profile deleted");
        Ok(())
    }

    /// The whole catalogue.
    pub async fn products(&self) -> Result<Vec<Product>, UserError> {
        Ok(self.catalog.all().await?)
    }

    /// One product.
    pub async fn product(&self, id: &str) -> Result<Product, UserError> {
        self.catalog
            .by_id(id.trim())
            .await?
            .ok_or(UserError::ProductNotFound)
    }

    /// Products in `category`.
    pub async fn products_in(&self, category: &str) -> Result<Vec<Product>, UserError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(UserError::Validation("category is required".to_string()));
        }
        Ok(self.catalog.by_category(category).await?)
    }
}
