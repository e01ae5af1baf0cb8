//! Wire types shared by the authorization server and the companion client.

use serde::{Deserialize, Serialize};

/// The only grant type this server accepts.
pub const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";

/// Token type returned on every successful exchange.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Query parameters of `GET /authorize` and `GET /authorize/approve`.
///
/// Missing parameters deserialize as empty strings so that an absent
/// `client_id` is reported as an unknown client rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationParams {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default)]
    pub state: String,
}

/// Form body of `POST /token`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub grant_type: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    /// Sent by standard clients; not checked by this server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
}

/// Successful token endpoint response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, carried as a string on the wire.
    pub expires_in: String,
}

/// Resource owner attributes released by `GET /userinfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub name: String,
    pub email: String,
}
