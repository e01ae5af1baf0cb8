//! Configuration for the authorization server and the companion client.

use std::time::Duration;

use crate::server::oauth::{RegisteredClient, ResourceOwner};

/// Fallback values used when neither flags nor environment override them.
pub mod defaults {
    use std::time::Duration;

    /// Server listening port.
    pub const PORT: u16 = 8080;

    /// Pre-registered client.
    pub const CLIENT_ID: &str = "test-client";
    pub const CLIENT_SECRET: &str = "test-secret";

    /// The single resource owner every token is issued for.
    pub const OWNER_SUBJECT: &str = "user123";
    pub const OWNER_NAME: &str = "John Doe";
    pub const OWNER_EMAIL: &str = "john.doe@example.com";

    /// Access token lifetime: 1 hour.
    pub const TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

    /// Where the client expects the authorization server.
    pub const AUTH_SERVER_URL: &str = "http://localhost:8080";

    /// Redirect target registered by the client. Never actually served.
    pub const REDIRECT_URI: &str = "http://localhost:8081/callback";

    /// Scopes the client asks for. The server does not enforce them.
    pub const SCOPES: &[&str] = &["openid", "profile", "email"];

    /// Client request timeout.
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    /// Client connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Server configuration. Read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening port.
    pub port: u16,

    /// Public base URL for metadata documents (defaults to `http://localhost:{port}`).
    pub base_url: Option<String>,

    /// The pre-registered client.
    pub client: RegisteredClient,

    /// Profile released by the userinfo endpoint.
    pub resource_owner: ResourceOwner,

    /// Lifetime embedded in each access token's `exp` claim.
    pub token_lifetime: Duration,

    /// Maximum age of an authorization code. `None` means codes never expire.
    pub code_ttl: Option<Duration>,

    /// Check the signed `exp` claim on every protected request.
    pub enforce_token_expiry: bool,
}

impl Config {
    /// Create a configuration for the given client, with defaults elsewhere.
    #[must_use]
    pub fn new(client: RegisteredClient) -> Self {
        Self {
            port: defaults::PORT,
            base_url: None,
            client,
            resource_owner: ResourceOwner {
                subject: defaults::OWNER_SUBJECT.to_string(),
                name: defaults::OWNER_NAME.to_string(),
                email: defaults::OWNER_EMAIL.to_string(),
            },
            token_lifetime: defaults::TOKEN_LIFETIME,
            code_ttl: None,
            enforce_token_expiry: false,
        }
    }

    /// Create a test configuration that binds an ephemeral port.
    #[must_use]
    pub fn for_testing() -> Self {
        Self { port: 0, base_url: Some("http://localhost".to_string()), ..Self::default() }
    }

    /// Set the code TTL from a seconds value; zero disables expiry.
    #[must_use]
    pub fn with_code_ttl_secs(mut self, secs: u64) -> Self {
        self.code_ttl = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    /// Issuer URL, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://localhost:{}", self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(RegisteredClient::new(defaults::CLIENT_ID, defaults::CLIENT_SECRET))
    }
}

/// Companion client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,

    /// Base URL of the authorization server.
    pub auth_server_url: String,

    /// Redirect target sent on the authorization request.
    pub redirect_uri: String,

    pub scopes: Vec<String>,

    /// Request timeout.
    pub request_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,
}

impl ClientConfig {
    /// Create a client configuration against the default server.
    #[must_use]
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_server_url: defaults::AUTH_SERVER_URL.to_string(),
            redirect_uri: defaults::REDIRECT_URI.to_string(),
            scopes: defaults::SCOPES.iter().map(ToString::to_string).collect(),
            request_timeout: defaults::REQUEST_TIMEOUT,
            connect_timeout: defaults::CONNECT_TIMEOUT,
        }
    }

    /// Point the client at another authorization server.
    #[must_use]
    pub fn with_auth_server(mut self, url: impl Into<String>) -> Self {
        self.auth_server_url = url.into();
        self
    }

    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Create a test configuration with short timeouts for mock servers.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Self::default().with_auth_server(base_url)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(defaults::CLIENT_ID, defaults::CLIENT_SECRET)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("auth_server_url", &self.auth_server_url)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}
