//! The authorization code state machine.
//!
//! ```text
//! Requested --approve--> Approved --exchange--> Exchanged
//!                                      \------> Rejected
//! ```
//!
//! A code is removed from the store the moment it is looked up, before any
//! credential check, so a failed exchange still burns it.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::keys::TokenSigner;
use super::registry::ClientRegistry;
use super::store::{self, GrantStore};
use super::types::{AccessTokenClaims, CodeGrant, RegisteredClient, ResourceOwner};
use crate::config::{Config, defaults};
use crate::error::{OAuthError, OAuthResult};
use crate::models::{
    AuthorizationParams, GRANT_AUTHORIZATION_CODE, TOKEN_TYPE_BEARER, TokenRequest, TokenResponse,
};

/// Drives authorize, approve, and token exchange. Owns all grant mutations.
#[derive(Clone)]
pub struct AuthorizationEngine {
    registry: Arc<ClientRegistry>,
    store: Arc<dyn GrantStore>,
    signer: Arc<dyn TokenSigner>,
    owner: Arc<ResourceOwner>,
    token_lifetime: Duration,
    code_ttl: Option<Duration>,
}

impl AuthorizationEngine {
    /// Create an engine with the default token lifetime and no code expiry.
    #[must_use]
    pub fn new(
        registry: ClientRegistry,
        store: Arc<dyn GrantStore>,
        signer: Arc<dyn TokenSigner>,
        owner: ResourceOwner,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
            signer,
            owner: Arc::new(owner),
            token_lifetime: defaults::TOKEN_LIFETIME,
            code_ttl: None,
        }
    }

    /// Create an engine from server configuration.
    #[must_use]
    pub fn from_config(
        config: &Config,
        store: Arc<dyn GrantStore>,
        signer: Arc<dyn TokenSigner>,
    ) -> Self {
        Self::new(
            ClientRegistry::new([config.client.clone()]),
            store,
            signer,
            config.resource_owner.clone(),
        )
        .with_token_lifetime(config.token_lifetime)
        .with_code_ttl(config.code_ttl)
    }

    #[must_use]
    pub const fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    /// Reject codes older than `ttl` at exchange time. `None` or a zero TTL keeps codes valid until used.
    #[must_use]
    pub fn with_code_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.code_ttl = ttl.filter(|ttl| !ttl.is_zero());
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn GrantStore> {
        &self.store
    }

    #[must_use]
    pub fn signer(&self) -> &Arc<dyn TokenSigner> {
        &self.signer
    }

    #[must_use]
    pub fn resource_owner(&self) -> &ResourceOwner {
        &self.owner
    }

    #[must_use]
    pub const fn code_ttl(&self) -> Option<Duration> {
        self.code_ttl
    }

    /// Requested: the client must be registered.
    pub fn request(&self, params: &AuthorizationParams) -> OAuthResult<&RegisteredClient> {
        self.registry.get(&params.client_id).ok_or_else(|| {
            tracing::warn!(client_id = %params.client_id, "Authorization requested by unknown client");
            OAuthError::UnknownClient
        })
    }

    /// Approved: issue a code bound to the client and return the redirect target.
    ///
    /// The redirect carries the code and the caller's `state` unchanged.
    pub async fn approve(&self, params: &AuthorizationParams) -> OAuthResult<Url> {
        let client = self.request(params)?;
        let mut redirect = parse_redirect_uri(&params.redirect_uri)?;

        let code = store::generate_code();
        self.store.put_code(code.clone(), CodeGrant::new(client.client_id.clone())).await;

        redirect
            .query_pairs_mut()
            .append_pair("code", &code)
            .append_pair("state", &params.state);

        tracing::info!(client_id = %client.client_id, "Approved authorization request");
        Ok(redirect)
    }

    /// Exchanged or Rejected: trade a code plus client credentials for a bearer token.
    ///
    /// Checks run in order: grant type, code existence (consuming it), code
    /// freshness, then client binding and secret.
    pub async fn exchange(&self, request: &TokenRequest) -> OAuthResult<TokenResponse> {
        if request.grant_type != GRANT_AUTHORIZATION_CODE {
            tracing::warn!(grant_type = %request.grant_type, "Unsupported grant type");
            return Err(OAuthError::UnsupportedGrant { grant_type: request.grant_type.clone() });
        }

        let Some(grant) = self.store.take_code(&request.code).await else {
            tracing::warn!(client_id = %request.client_id, "Unknown or reused authorization code");
            return Err(OAuthError::InvalidGrant);
        };

        if self.code_ttl.is_some_and(|ttl| grant.is_older_than(ttl)) {
            tracing::warn!(client_id = %grant.client_id, "Authorization code expired");
            return Err(OAuthError::InvalidGrant);
        }

        if grant.client_id != request.client_id
            || !self.registry.verify(&request.client_id, &request.client_secret)
        {
            tracing::warn!(
                client_id = %request.client_id,
                bound_to = %grant.client_id,
                "Client credentials do not match authorization code"
            );
            return Err(OAuthError::InvalidClient);
        }

        let access_token = self.mint_token()?;
        self.store.put_token(access_token.clone(), self.owner.subject.clone()).await;

        tracing::info!(client_id = %grant.client_id, subject = %self.owner.subject, "Issued access token");

        Ok(TokenResponse {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.token_lifetime.as_secs().to_string(),
        })
    }

    fn mint_token(&self) -> OAuthResult<String> {
        let now = chrono::Utc::now().timestamp();
        let lifetime = i64::try_from(self.token_lifetime.as_secs()).unwrap_or(i64::MAX);

        let claims = AccessTokenClaims {
            sub: self.owner.subject.clone(),
            iat: now,
            exp: now.saturating_add(lifetime),
            jti: uuid::Uuid::new_v4().simple().to_string(),
        };

        self.signer.sign(&claims).inspect_err(|e| {
            tracing::error!(error = ?e, "Failed to sign access token");
        })
    }
}

impl std::fmt::Debug for AuthorizationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationEngine")
            .field("clients", &self.registry.len())
            .field("token_lifetime", &self.token_lifetime)
            .field("code_ttl", &self.code_ttl)
            .finish()
    }
}

fn parse_redirect_uri(redirect_uri: &str) -> OAuthResult<Url> {
    Url::parse(redirect_uri)
        .map_err(|e| OAuthError::malformed_query(format!("invalid redirect_uri: {e}")))
}
