//! HTTP transport: router construction and shared handler state.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::oauth::handlers;
use super::oauth::{AuthorizationEngine, ResourceGuard};

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub engine: AuthorizationEngine,
    pub guard: ResourceGuard,
    /// Issuer URL used in metadata documents.
    pub base_url: String,
}

/// Create the HTTP router for the authorization server.
pub fn create_router(engine: AuthorizationEngine, guard: ResourceGuard, base_url: String) -> Router {
    let state = Arc::new(HttpState {
        engine,
        guard,
        base_url: base_url.trim_end_matches('/').to_string(),
    });

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Discovery
        .route("/.well-known/oauth-authorization-server", get(handlers::handle_auth_server_metadata))
        .route("/.well-known/jwks.json", get(handlers::handle_jwks))
        // Authorization code flow
        .route("/authorize", get(handlers::handle_authorize))
        .route("/authorize/approve", get(handlers::handle_approve))
        .route("/token", post(handlers::handle_token))
        // Protected resource
        .route("/userinfo", get(handlers::handle_userinfo))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "oauth2-codeflow",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let counts = state.engine.store().counts().await;
    Json(serde_json::json!({
        "status": "ready",
        "service": "oauth2-codeflow",
        "version": env!("CARGO_PKG_VERSION"),
        "pending_codes": counts.codes,
        "issued_tokens": counts.tokens,
        "enforces_token_expiry": state.guard.enforces_expiry()
    }))
}
