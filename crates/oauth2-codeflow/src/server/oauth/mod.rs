//! OAuth 2.0 authorization code server.
//!
//! A single pre-registered client obtains codes through an auto-approved
//! authorization step, exchanges them for RS256-signed bearer tokens, and
//! presents those tokens to the userinfo endpoint.
//!
//! ## Supported Standards
//! - RFC 6749: Authorization Code Grant
//! - RFC 6750: Bearer Token Usage
//! - RFC 7517: JSON Web Key
//! - RFC 8414: OAuth Authorization Server Metadata

pub mod consent;
pub mod engine;
pub mod guard;
pub mod handlers;
pub mod keys;
pub mod registry;
pub mod store;
pub mod types;

pub use engine::AuthorizationEngine;
pub use guard::ResourceGuard;
pub use keys::{KeyMaterial, TokenSigner};
pub use registry::ClientRegistry;
pub use store::{GrantStore, InMemoryGrantStore};
pub use types::{RegisteredClient, ResourceOwner};
