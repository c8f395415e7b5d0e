//! Credential storage.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::config::UserConfig;
use crate::error::GateError;

/// Opaque identity → secret lookup consulted at login.
pub trait CredentialStore: Send + Sync {
    /// Returns true iff `identity` has a record whose secret equals `secret`.
    ///
    /// Unknown identities return false.
    fn authenticate(&self, identity: &str, secret: &str) -> bool;

    /// Adds a new record. Existing records are never overwritten.
    fn register(&self, identity: &str, secret: &str) -> Result<(), GateError>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Thread-safe in-memory credential table.
///
/// Secrets are stored and compared in plaintext.
#[derive(Clone, Default)]
pub struct InMemoryCredentialStore {
    records: Arc<DashMap<String, String>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded from configured users.
    ///
    /// Later duplicates of an identity are ignored.
    pub fn from_users(users: &[UserConfig]) -> Self {
        let store = Self::new();
        for user in users {
            if store.register(&user.username, &user.password).is_err() {
                tracing::warn!(username = %user.username, "Skipping duplicate or empty seeded user");
            }
        }
        store
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn authenticate(&self, identity: &str, secret: &str) -> bool {
        self.records
            .get(identity)
            .map(|stored| stored.value() == secret)
            .unwrap_or(false)
    }

    fn register(&self, identity: &str, secret: &str) -> Result<(), GateError> {
        if identity.is_empty() {
            return Err(GateError::InvalidIdentity);
        }

        match self.records.entry(identity.to_string()) {
            Entry::Occupied(_) => Err(GateError::IdentityTaken),
            Entry::Vacant(slot) => {
                slot.insert(secret.to_string());
                Ok(())
            }
        }
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
