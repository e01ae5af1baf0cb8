//! OAuth 2.0 endpoint handlers.
//!
//! Implements:
//! - RFC 6749: Authorization Code Grant (authorize, approve, token)
//! - RFC 6750: Bearer token usage (userinfo)
//! - RFC 8414: OAuth Authorization Server Metadata
//! - RFC 7517: JSON Web Key Set for the token signing key

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{Query, State, rejection::FormRejection, rejection::QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};

use super::consent;
use super::keys::JwkSet;
use crate::error::{OAuthError, TokenRejection};
use crate::models::{AuthorizationParams, GRANT_AUTHORIZATION_CODE, TokenRequest, TokenResponse, UserInfo};
use crate::server::transport::HttpState;

// ─── RFC 8414: Authorization Server Metadata ─────────────────────────────────

/// `GET /.well-known/oauth-authorization-server`
///
/// Describes the OAuth endpoints and capabilities.
pub async fn handle_auth_server_metadata(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "issuer": state.base_url,
        "authorization_endpoint": format!("{}/authorize", state.base_url),
        "token_endpoint": format!("{}/token", state.base_url),
        "userinfo_endpoint": format!("{}/userinfo", state.base_url),
        "jwks_uri": format!("{}/.well-known/jwks.json", state.base_url),
        "response_types_supported": ["code"],
        "grant_types_supported": [GRANT_AUTHORIZATION_CODE],
        "token_endpoint_auth_methods_supported": ["client_secret_post"],
        "id_token_signing_alg_values_supported": ["RS256"]
    }))
}

/// `GET /.well-known/jwks.json`
///
/// Public half of the signing key, for resource servers verifying tokens offline.
pub async fn handle_jwks(State(state): State<Arc<HttpState>>) -> Json<JwkSet> {
    Json(state.engine.signer().jwks())
}

// ─── Authorization Endpoint ──────────────────────────────────────────────────

/// `GET /authorize`
///
/// Validate the client and show the approval step.
pub async fn handle_authorize(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<AuthorizationParams>, QueryRejection>,
) -> Result<Html<String>, OAuthError> {
    let Query(params) = query.map_err(|e| OAuthError::malformed_query(e.body_text()))?;
    state.engine.request(&params)?;
    Ok(Html(consent::render_approval_page(&params)))
}

/// `GET /authorize/approve`
///
/// Issue a code and redirect back to the client with the code and the original state.
pub async fn handle_approve(
    State(state): State<Arc<HttpState>>,
    query: Result<Query<AuthorizationParams>, QueryRejection>,
) -> Result<Response, OAuthError> {
    let Query(params) = query.map_err(|e| OAuthError::malformed_query(e.body_text()))?;
    let redirect = state.engine.approve(&params).await?;
    Ok((StatusCode::FOUND, [(header::LOCATION, redirect.to_string())]).into_response())
}

// ─── Token Endpoint ──────────────────────────────────────────────────────────

/// `POST /token`
///
/// Exchange an authorization code and client credentials for an access token.
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let request = match form {
        Ok(Form(request)) => request,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Unparseable token request");
            return OAuthError::malformed(rejection.body_text()).into_response();
        }
    };

    match state.engine.exchange(&request).await {
        Ok(token) => token_success(token),
        Err(e) => e.into_response(),
    }
}

/// Build a token response with required OAuth 2.0 cache headers (RFC 6749 §5.1).
fn token_success(token: TokenResponse) -> Response {
    let mut response = Json(token).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Protected Resource ──────────────────────────────────────────────────────

/// `GET /userinfo`
///
/// Release the resource owner profile to a valid bearer token.
pub async fn handle_userinfo(
    State(state): State<Arc<HttpState>>,
    authorization: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
) -> Result<Json<UserInfo>, OAuthError> {
    let TypedHeader(Authorization(bearer)) = authorization.map_err(|rejection| {
        let reason = if rejection.is_missing() {
            TokenRejection::MissingHeader
        } else {
            TokenRejection::MalformedHeader
        };
        OAuthError::InvalidToken(reason)
    })?;

    Ok(Json(state.guard.authorize(bearer.token()).await?))
}
