//! Authorization server wiring.
//!
//! Builds the engine, guard, and store from [`Config`] and serves them over HTTP.

pub mod oauth;
pub mod transport;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use oauth::{
    AuthorizationEngine, GrantStore, InMemoryGrantStore, KeyMaterial, ResourceGuard, TokenSigner,
};

/// The authorization server.
pub struct AuthServer {
    engine: AuthorizationEngine,
    guard: ResourceGuard,
    base_url: String,
    port: u16,
}

impl AuthServer {
    /// Create a server backed by the in-memory grant store.
    #[must_use]
    pub fn new(config: &Config, keys: Arc<KeyMaterial>) -> Self {
        Self::with_store(config, keys, Arc::new(InMemoryGrantStore::new()))
    }

    /// Create a server from an explicit signer and grant store.
    #[must_use]
    pub fn with_store(
        config: &Config,
        signer: Arc<dyn TokenSigner>,
        store: Arc<dyn GrantStore>,
    ) -> Self {
        let engine = AuthorizationEngine::from_config(config, Arc::clone(&store), Arc::clone(&signer));

        let mut guard = ResourceGuard::new(store, config.resource_owner.clone());
        if config.enforce_token_expiry {
            guard = guard.enforcing_expiry(signer);
        }

        Self { engine, guard, base_url: config.base_url(), port: config.port }
    }

    #[must_use]
    pub const fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    /// Build the HTTP router.
    #[must_use]
    pub fn router(&self) -> Router {
        transport::create_router(self.engine.clone(), self.guard.clone(), self.base_url.clone())
    }

    /// Listen on the configured port until Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns error on bind or server failure.
    pub async fn run_http(self) -> anyhow::Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("HTTP server listening on http://{}", addr);

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already-bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sweeper = self
            .engine
            .code_ttl()
            .map(|ttl| oauth::store::start_code_sweeper(Arc::clone(self.engine.store()), ttl));

        let router = self.router();
        let result = axum::serve(listener, router).with_graceful_shutdown(shutdown).await;

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }
        result?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for AuthServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthServer")
            .field("base_url", &self.base_url)
            .field("port", &self.port)
            .finish()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
