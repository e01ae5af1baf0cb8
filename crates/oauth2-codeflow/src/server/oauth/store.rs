//! Grant storage: issued authorization codes and access tokens.
//!
//! The engine talks to storage only through [`GrantStore`], so the locking
//! discipline lives here and can be tested without any HTTP in the way.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::types::CodeGrant;

/// Storage operations the authorization engine relies on.
///
/// `take_code` must be atomic: two concurrent calls with the same code can
/// never both return `Some`.
#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Record a freshly issued code.
    async fn put_code(&self, code: String, grant: CodeGrant);

    /// Look up and delete a code in one step.
    async fn take_code(&self, code: &str) -> Option<CodeGrant>;

    /// Record an issued access token and the subject it represents.
    async fn put_token(&self, token: String, subject: String);

    /// Subject of a previously issued token.
    async fn token_subject(&self, token: &str) -> Option<String>;

    /// Drop codes issued more than `ttl` ago. Returns how many were removed.
    async fn purge_codes_older_than(&self, ttl: Duration) -> usize;

    /// Number of outstanding codes and issued tokens.
    async fn counts(&self) -> StoreCounts;
}

/// Snapshot of store occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub codes: usize,
    pub tokens: usize,
}

#[derive(Default)]
struct GrantTables {
    codes: HashMap<String, CodeGrant>,
    tokens: HashMap<String, String>,
}

/// In-memory grant store. One lock guards both tables.
#[derive(Clone, Default)]
pub struct InMemoryGrantStore {
    tables: Arc<Mutex<GrantTables>>,
}

impl InMemoryGrantStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn put_code(&self, code: String, grant: CodeGrant) {
        self.tables.lock().await.codes.insert(code, grant);
    }

    async fn take_code(&self, code: &str) -> Option<CodeGrant> {
        self.tables.lock().await.codes.remove(code)
    }

    async fn put_token(&self, token: String, subject: String) {
        self.tables.lock().await.tokens.insert(token, subject);
    }

    async fn token_subject(&self, token: &str) -> Option<String> {
        self.tables.lock().await.tokens.get(token).cloned()
    }

    async fn purge_codes_older_than(&self, ttl: Duration) -> usize {
        let mut tables = self.tables.lock().await;
        let before = tables.codes.len();
        tables.codes.retain(|_, grant| !grant.is_older_than(ttl));
        before - tables.codes.len()
    }

    async fn counts(&self) -> StoreCounts {
        let tables = self.tables.lock().await;
        StoreCounts { codes: tables.codes.len(), tokens: tables.tokens.len() }
    }
}

impl std::fmt::Debug for InMemoryGrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryGrantStore").finish()
    }
}

/// Generate an unpredictable opaque value from two UUIDs (256 bits).
#[must_use]
pub fn generate_code() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

/// Start a background task that purges codes older than `ttl`, checking once per `ttl`.
///
/// A zero `ttl` means codes never expire; the task then exits without purging.
pub fn start_code_sweeper(store: Arc<dyn GrantStore>, ttl: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        if ttl.is_zero() {
            tracing::warn!("Zero code TTL, sweeper disabled");
            return;
        }

        let mut interval = tokio::time::interval(ttl);
        loop {
            interval.tick().await;
            let removed = store.purge_codes_older_than(ttl).await;
            if removed > 0 {
                tracing::debug!(count = removed, "Purged stale authorization codes");
            }
        }
    })
}
