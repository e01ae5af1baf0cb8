//! Common test utilities for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, LazyLock};

use axum::body::Body;
use axum::http::{Request, Response};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use oauth2_codeflow::config::Config;
use oauth2_codeflow::server::AuthServer;
use oauth2_codeflow::server::oauth::{
    AuthorizationEngine, ClientRegistry, InMemoryGrantStore, KeyMaterial, RegisteredClient,
    ResourceOwner,
};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://x/callback";

/// One RSA key per test binary; generation is too slow to repeat per test.
pub static KEYS: LazyLock<Arc<KeyMaterial>> =
    LazyLock::new(|| Arc::new(KeyMaterial::generate().expect("key generation")));

pub fn keys() -> Arc<KeyMaterial> {
    Arc::clone(&KEYS)
}

pub fn owner() -> ResourceOwner {
    ResourceOwner {
        subject: "user123".to_string(),
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
    }
}

/// Engine with two registered clients and a fresh in-memory store.
pub fn build_engine() -> (AuthorizationEngine, Arc<InMemoryGrantStore>) {
    let store = Arc::new(InMemoryGrantStore::new());
    let registry = ClientRegistry::new([
        RegisteredClient::new(CLIENT_ID, CLIENT_SECRET),
        RegisteredClient::new("other-client", "other-secret"),
    ]);
    let engine = AuthorizationEngine::new(registry, store.clone(), keys(), owner());
    (engine, store)
}

pub fn build_test_router(config: &Config) -> axum::Router {
    AuthServer::new(config, keys()).router()
}

pub fn authorize_uri(path: &str, client_id: &str, redirect_uri: &str, state: &str) -> String {
    let query = serde_urlencoded::to_string([
        ("client_id", client_id),
        ("redirect_uri", redirect_uri),
        ("state", state),
    ])
    .unwrap();
    format!("{path}?{query}")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_form(uri: &str, params: &[(&str, &str)]) -> Request<Body> {
    Request::post(uri)
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(params).unwrap()))
        .unwrap()
}

pub fn token_form<'a>(code: &'a str, client_id: &'a str, secret: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", client_id),
        ("client_secret", secret),
    ]
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Query pairs of a `Location` header.
pub fn location_pairs(response: &Response<Body>) -> std::collections::HashMap<String, String> {
    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    url::Url::parse(location).unwrap().query_pairs().into_owned().collect()
}

/// A server bound to an ephemeral port, running in the background.
pub struct TestServer {
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(config: &Config) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = AuthServer::new(config, keys());

        let handle = tokio::spawn(async move {
            server.serve(listener, std::future::pending()).await.unwrap();
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
