#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use auth_service::jwt::{Clock, SystemClock};
use auth_service::metrics::AuthMetrics;
use auth_service::users::InMemoryUserDirectory;
use auth_service::{AuthService, TokenIssuer, TokenSettings};
use secrecy::SecretString;

pub fn settings() -> TokenSettings {
    TokenSettings {
        access_secret: SecretString::from("access-secret-access-secret-0123".to_string()),
        refresh_secret: SecretString::from("refresh-secret-refresh-secret-01".to_string()),
        access_ttl: Duration::from_secs(900),
        refresh_ttl: Duration::from_secs(7 * 86_400),
        issuer: "auth-service".to_string(),
    }
}

pub fn issuer_with(clock: Arc<dyn Clock>) -> TokenIssuer {
    TokenIssuer::new(&settings(), clock, AuthMetrics::detached().unwrap())
}

pub fn service() -> Arc<AuthService> {
    let issuer = Arc::new(issuer_with(Arc::new(SystemClock)));
    Arc::new(AuthService::new(Arc::new(InMemoryUserDirectory::new()), issuer))
}
