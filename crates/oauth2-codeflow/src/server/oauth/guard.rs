//! Bearer token validation for protected resources.

use std::sync::Arc;

use super::keys::TokenSigner;
use super::store::GrantStore;
use super::types::ResourceOwner;
use crate::error::{OAuthError, OAuthResult, TokenRejection};
use crate::models::UserInfo;

/// Releases resource owner attributes to holders of an issued token.
///
/// By default a token is valid as long as the store knows it; the signed
/// `exp` claim is only checked when expiry enforcement is switched on.
#[derive(Clone)]
pub struct ResourceGuard {
    store: Arc<dyn GrantStore>,
    owner: ResourceOwner,
    verifier: Option<Arc<dyn TokenSigner>>,
}

impl ResourceGuard {
    #[must_use]
    pub fn new(store: Arc<dyn GrantStore>, owner: ResourceOwner) -> Self {
        Self { store, owner, verifier: None }
    }

    /// Also verify signature and `exp` of every presented token.
    #[must_use]
    pub fn enforcing_expiry(mut self, signer: Arc<dyn TokenSigner>) -> Self {
        self.verifier = Some(signer);
        self
    }

    #[must_use]
    pub const fn enforces_expiry(&self) -> bool {
        self.verifier.is_some()
    }

    /// Validate a bearer token and return the profile it grants access to.
    pub async fn authorize(&self, token: &str) -> OAuthResult<UserInfo> {
        let Some(subject) = self.store.token_subject(token).await else {
            tracing::warn!("Rejected unknown bearer token");
            return Err(OAuthError::InvalidToken(TokenRejection::Unknown));
        };

        if let Some(signer) = &self.verifier {
            signer.verify(token)?;
        }

        if subject != self.owner.subject {
            tracing::warn!(subject = %subject, "Token subject has no profile");
            return Err(OAuthError::InvalidToken(TokenRejection::Unknown));
        }

        Ok(self.owner.profile())
    }
}

impl std::fmt::Debug for ResourceGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceGuard")
            .field("subject", &self.owner.subject)
            .field("enforces_expiry", &self.enforces_expiry())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::oauth::store::InMemoryGrantStore;

    fn owner() -> ResourceOwner {
        ResourceOwner {
            subject: "user123".into(),
            name: "John Doe".into(),
            email: "john.doe@example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_known_token_returns_profile() {
        let store = Arc::new(InMemoryGrantStore::new());
        store.put_token("tok".into(), "user123".into()).await;

        let guard = ResourceGuard::new(store, owner());
        let info = guard.authorize("tok").await.unwrap();
        assert_eq!(info.sub, "user123");
        assert_eq!(info.name, "John Doe");
        assert_eq!(info.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn test_unknown_token_rejected() {
        let guard = ResourceGuard::new(Arc::new(InMemoryGrantStore::new()), owner());
        assert!(matches!(
            guard.authorize("arbitrary-string").await,
            Err(OAuthError::InvalidToken(TokenRejection::Unknown))
        ));
    }

    #[tokio::test]
    async fn test_foreign_subject_rejected() {
        let store = Arc::new(InMemoryGrantStore::new());
        store.put_token("tok".into(), "someone-else".into()).await;

        let guard = ResourceGuard::new(store, owner());
        assert!(guard.authorize("tok").await.is_err());
    }

    #[tokio::test]
    async fn test_membership_only_by_default() {
        // Not a JWT at all, but the store knows it.
        let store = Arc::new(InMemoryGrantStore::new());
        store.put_token("opaque".into(), "user123".into()).await;

        let guard = ResourceGuard::new(store, owner());
        assert!(!guard.enforces_expiry());
        assert!(guard.authorize("opaque").await.is_ok());
    }
}
