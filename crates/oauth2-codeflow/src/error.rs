//! Error types for the authorization server and the companion client.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::fmt;

use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Why a bearer credential was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No `Authorization` header at all.
    MissingHeader,
    /// Header present but not `Bearer <token>`.
    MalformedHeader,
    /// Token never issued by this server, or its signature does not verify.
    Unknown,
    /// Token's signed `exp` is in the past.
    Expired,
}

impl fmt::Display for TokenRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Self::MissingHeader => "Missing Authorization header",
            Self::MalformedHeader => "Invalid Authorization header format",
            Self::Unknown => "Invalid access token",
            Self::Expired => "Access token expired",
        };
        f.write_str(message)
    }
}

/// The part of a request that failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPart {
    /// `application/x-www-form-urlencoded` body.
    Form,
    /// URL query string, including the values carried in it.
    Query,
}

impl fmt::Display for RequestPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Form => "form",
            Self::Query => "query",
        })
    }
}

/// Errors from the authorization server core.
///
/// Every variant is terminal for the request that produced it.
#[derive(thiserror::Error, Debug)]
pub enum OAuthError {
    /// The client identifier is not in the registry.
    #[error("Invalid client")]
    UnknownClient,

    /// The token request named a grant type other than `authorization_code`.
    #[error("Unsupported grant type")]
    UnsupportedGrant {
        /// The grant type that was presented
        grant_type: String,
    },

    /// The authorization code is unknown, already used, or stale.
    #[error("Invalid client credentials or authorization code")]
    InvalidGrant,

    /// The code is bound to another client, or the secret does not match.
    #[error("Invalid client credentials or authorization code")]
    InvalidClient,

    /// Bearer credential missing, malformed, or not recognised.
    #[error("{0}")]
    InvalidToken(TokenRejection),

    /// The request could not be parsed.
    #[error("Unable to parse {part}")]
    MalformedRequest {
        /// Which part of the request was unreadable
        part: RequestPart,
        /// What was wrong with the request
        detail: String,
    },

    /// Key generation or token signing failed.
    #[error("Error generating token")]
    SigningFailure {
        /// Underlying cause
        detail: String,
    },
}

impl OAuthError {
    /// Create a malformed request error for an unreadable form body.
    #[must_use]
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedRequest { part: RequestPart::Form, detail: detail.into() }
    }

    /// Create a malformed request error for unreadable query parameters.
    #[must_use]
    pub fn malformed_query(detail: impl Into<String>) -> Self {
        Self::MalformedRequest { part: RequestPart::Query, detail: detail.into() }
    }

    /// Create a signing failure.
    #[must_use]
    pub fn signing(detail: impl fmt::Display) -> Self {
        Self::SigningFailure { detail: detail.to_string() }
    }

    /// HTTP status for this error.
    ///
    /// Only `SigningFailure` is a server fault.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownClient | Self::UnsupportedGrant { .. } | Self::MalformedRequest { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidGrant | Self::InvalidClient | Self::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            Self::SigningFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true if the caller, not the server, is at fault.
    #[must_use]
    pub const fn is_client_fault(&self) -> bool {
        !matches!(self, Self::SigningFailure { .. })
    }
}

impl From<jsonwebtoken::errors::Error> for OAuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        Self::signing(e)
    }
}

impl From<rsa::Error> for OAuthError {
    fn from(e: rsa::Error) -> Self {
        Self::signing(e)
    }
}

impl From<rsa::pkcs1::Error> for OAuthError {
    fn from(e: rsa::pkcs1::Error) -> Self {
        Self::signing(e)
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, self.to_string()).into_response();

        if matches!(self, Self::InvalidToken(_)) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Bearer error="invalid_token""#),
            );
        }
        response
    }
}

/// Errors from the companion client.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server or redirect URL could not be parsed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success status
    #[error("Request rejected ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The redirect carried a state other than the one we sent
    #[error("State mismatch: expected {expected:?}, received {received:?}")]
    StateMismatch {
        /// State sent on the authorization request
        expected: String,
        /// State found on the redirect
        received: String,
    },

    /// Nothing that looks like an authorization code was supplied
    #[error("No authorization code found in input")]
    MissingCode,
}

impl ClientError {
    /// Create a rejected error.
    #[must_use]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected { status, message: message.into() }
    }

    /// HTTP status of a rejection, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for server core operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
