//! Companion client for the authorization code flow.
//!
//! Drives the round trip a registered application performs:
//! - Build the authorization URL the resource owner visits
//! - Read the code back from the redirect (or a pasted code)
//! - Exchange the code for a bearer token
//! - Fetch the resource owner's profile with that token
//!
//! Requests are never retried: a code exchange that reached the server has
//! already consumed the code.

use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{GRANT_AUTHORIZATION_CODE, TokenRequest, TokenResponse, UserInfo};

/// HTTP client for the authorization server.
#[derive(Clone)]
pub struct CodeFlowClient {
    /// HTTP client.
    http: Client,

    /// Client credentials and endpoints.
    config: ClientConfig,
}

impl CodeFlowClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the server URL is invalid or HTTP client initialization fails.
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        Url::parse(&config.auth_server_url)?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { http, config })
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL the resource owner opens to start the flow.
    pub fn authorization_url(&self, state: &str) -> ClientResult<Url> {
        let mut url = self.endpoint("authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state);
        Ok(url)
    }

    /// Extract the authorization code from what the user pasted.
    ///
    /// Accepts either the bare code or the full redirect URL. When a URL is
    /// given its `state` must equal `expected_state`.
    pub fn parse_callback(input: &str, expected_state: &str) -> ClientResult<String> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ClientError::MissingCode);
        }

        let Ok(redirect) = Url::parse(input) else {
            return Ok(input.to_string());
        };

        let mut code = None;
        let mut state = String::new();
        for (key, value) in redirect.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = value.into_owned(),
                _ => {}
            }
        }

        if state != expected_state {
            return Err(ClientError::StateMismatch {
                expected: expected_state.to_string(),
                received: state,
            });
        }

        code.filter(|c| !c.is_empty()).ok_or(ClientError::MissingCode)
    }

    /// Exchange an authorization code for an access token.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or if the server rejects the exchange.
    pub async fn exchange_code(&self, code: &str) -> ClientResult<TokenResponse> {
        let url = self.endpoint("token")?;

        let form = TokenRequest {
            grant_type: GRANT_AUTHORIZATION_CODE.to_string(),
            code: code.to_string(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            redirect_uri: Some(self.config.redirect_uri.clone()),
        };

        tracing::debug!(client_id = %self.config.client_id, "Exchanging authorization code");

        let response = self.http.post(url).form(&form).send().await?;
        let response = Self::handle_response(response).await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch the resource owner's profile.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure or if the token is refused.
    pub async fn user_info(&self, access_token: &str) -> ClientResult<UserInfo> {
        let url = self.endpoint("userinfo")?;

        let response = self.http.get(url).bearer_auth(access_token).send().await?;
        let response = Self::handle_response(response).await?;
        let body = response.text().await?;

        Ok(serde_json::from_str(&body)?)
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let base = self.config.auth_server_url.trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Turn non-success statuses into errors carrying the response body.
    async fn handle_response(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %text.trim(), "Request rejected");
        Err(ClientError::rejected(status.as_u16(), text.trim()))
    }
}

impl std::fmt::Debug for CodeFlowClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeFlowClient").field("config", &self.config).finish()
    }
}
