//! Credential persistence boundary.
//!
//! The client only ever calls the three operations on [`CredentialStore`],
//! keyed by consumer key; what a store does with the values is its own
//! business. The crate ships [`MemoryStore`] for tests and embedding;
//! durable backends (system keyring, encrypted files) implement the trait
//! outside this crate.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The credential triple a store holds per consumer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// OAuth token.
    pub token: String,
    /// OAuth token secret.
    pub token_secret: String,
    /// Account identifier the token pair belongs to.
    pub account_id: String,
}

/// External storage for authorized credentials, keyed by consumer key.
pub trait CredentialStore: fmt::Debug + Send + Sync {
    /// Persists credentials for a consumer key, replacing any previous
    /// entry.
    fn save(&self, consumer_key: &str, credentials: &StoredCredentials) -> Result<()>;

    /// Loads the credentials stored for a consumer key, if any.
    fn load(&self, consumer_key: &str) -> Result<Option<StoredCredentials>>;

    /// Forgets the credentials stored for a consumer key. Clearing an
    /// absent entry is not an error.
    fn clear(&self, consumer_key: &str) -> Result<()>;
}

/// In-memory credential store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredCredentials>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn save(&self, consumer_key: &str, credentials: &StoredCredentials) -> Result<()> {
        self.entries
            .lock()
            .expect("credential store mutex poisoned")
            .insert(consumer_key.to_string(), credentials.clone());
        Ok(())
    }

    fn load(&self, consumer_key: &str) -> Result<Option<StoredCredentials>> {
        Ok(self
            .entries
            .lock()
            .expect("credential store mutex poisoned")
            .get(consumer_key)
            .cloned())
    }

    fn clear(&self, consumer_key: &str) -> Result<()> {
        self.entries
            .lock()
            .expect("credential store mutex poisoned")
            .remove(consumer_key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> StoredCredentials {
        StoredCredentials {
            token: "tok".to_string(),
            token_secret: "ts".to_string(),
            account_id: "42".to_string(),
        }
    }

    #[test]
    fn save_load_clear_round_trip() {
        let store = MemoryStore::new();
        store.save("ck", &credentials()).unwrap();
        assert_eq!(store.load("ck").unwrap(), Some(credentials()));

        store.clear("ck").unwrap();
        assert_eq!(store.load("ck").unwrap(), None);
    }

    #[test]
    fn clearing_an_absent_entry_is_fine() {
        let store = MemoryStore::new();
        store.clear("never-saved").unwrap();
    }

    #[test]
    fn entries_are_keyed_by_consumer_key() {
        let store = MemoryStore::new();
        store.save("ck-one", &credentials()).unwrap();
        assert_eq!(store.load("ck-two").unwrap(), None);
    }
}
