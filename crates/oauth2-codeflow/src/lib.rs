//! OAuth 2.0 Authorization Code Flow
//!
//! A minimal authorization server and its companion client.
//!
//! # Features
//!
//! - **Single-use codes**: a code is consumed the moment it is presented
//! - **RS256 tokens**: bearer tokens are JWTs signed with a per-process RSA key
//! - **Injected storage**: grant bookkeeping sits behind the [`GrantStore`](server::oauth::GrantStore) trait
//! - **Companion client**: drives authorize, exchange, and userinfo end to end
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oauth2_codeflow::{config::Config, server::{AuthServer, oauth::KeyMaterial}};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let keys = Arc::new(KeyMaterial::generate()?);
//!
//!     AuthServer::new(&config, keys).run_http().await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod telemetry;

pub use client::CodeFlowClient;
pub use config::{ClientConfig, Config};
pub use error::{ClientError, OAuthError};
