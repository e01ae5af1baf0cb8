//! Static registry of clients allowed to use the authorization server.

use std::collections::HashMap;

use super::types::RegisteredClient;

/// Client id to registration mapping, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<String, RegisteredClient>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new(clients: impl IntoIterator<Item = RegisteredClient>) -> Self {
        Self {
            clients: clients.into_iter().map(|c| (c.client_id.clone(), c)).collect(),
        }
    }

    /// Look up a client by ID.
    #[must_use]
    pub fn get(&self, client_id: &str) -> Option<&RegisteredClient> {
        self.clients.get(client_id)
    }

    #[must_use]
    pub fn contains(&self, client_id: &str) -> bool {
        self.clients.contains_key(client_id)
    }

    /// True only if the client exists and `secret` is its registered secret.
    #[must_use]
    pub fn verify(&self, client_id: &str, secret: &str) -> bool {
        self.get(client_id).is_some_and(|c| c.client_secret == secret)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
