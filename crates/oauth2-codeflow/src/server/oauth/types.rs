//! OAuth 2.0 types held by the authorization server.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::models::UserInfo;

/// A pre-provisioned client allowed to request tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisteredClient {
    pub client_id: String,
    pub client_secret: String,
}

impl RegisteredClient {
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }
}

impl fmt::Debug for RegisteredClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredClient")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// The single identity on whose behalf every token is issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwner {
    pub subject: String,
    pub name: String,
    pub email: String,
}

impl ResourceOwner {
    /// Attributes released to holders of a valid bearer token.
    #[must_use]
    pub fn profile(&self) -> UserInfo {
        UserInfo {
            sub: self.subject.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// An authorization code record: who it was granted to, and when.
#[derive(Debug, Clone)]
pub struct CodeGrant {
    pub client_id: String,
    pub issued_at: Instant,
}

impl CodeGrant {
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), issued_at: Instant::now() }
    }

    /// Check if the code is older than `ttl`.
    #[must_use]
    pub fn is_older_than(&self, ttl: Duration) -> bool {
        self.issued_at.elapsed() > ttl
    }
}

/// Claims signed into every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token so two tokens minted in the same second differ.
    pub jti: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_client_debug_hides_secret() {
        let client = RegisteredClient::new("test-client", "super-secret");
        let debug = format!("{client:?}");
        assert!(debug.contains("test-client"));
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_code_grant_age() {
        let grant = CodeGrant::new("client1");
        assert!(!grant.is_older_than(Duration::from_secs(60)));

        std::thread::sleep(Duration::from_millis(5));
        assert!(grant.is_older_than(Duration::from_millis(1)));
    }
}
