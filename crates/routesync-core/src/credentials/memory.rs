// # Memory Credential Store
//
// In-memory implementation of CredentialStore.
//
// Nothing survives the process. Used by tests and by callers that supply the
// password on every run.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::Error;
use crate::traits::CredentialStore;

/// In-memory credential store
///
/// Clones share the same entries.
///
/// # Example
///
/// ```rust
/// use routesync_core::credentials::MemoryCredentialStore;
/// use routesync_core::traits::CredentialStore;
///
/// let store = MemoryCredentialStore::new();
/// store.set("192.168.88.1", "admin", "secret").unwrap();
/// assert_eq!(store.get("192.168.88.1", "admin").unwrap().as_deref(), Some("secret"));
/// assert_eq!(store.get("192.168.88.1", "other").unwrap(), None);
/// ```
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    inner: Arc<RwLock<HashMap<(String, String), String>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Secrets stay out of Debug output
impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore")
            .field("entries", &self.len())
            .finish()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>, Error> {
        let map = self
            .inner
            .read()
            .map_err(|_| Error::credential("credential map lock poisoned"))?;
        Ok(map.get(&(service.to_string(), user.to_string())).cloned())
    }

    fn set(&self, service: &str, user: &str, secret: &str) -> Result<(), Error> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| Error::credential("credential map lock poisoned"))?;
        map.insert((service.to_string(), user.to_string()), secret.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_existing_entry() {
        let store = MemoryCredentialStore::new();
        store.set("TestService", "TestUser", "first").unwrap();
        store.set("TestService", "TestUser", "TestPassword").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("TestService", "TestUser").unwrap().as_deref(),
            Some("TestPassword")
        );
    }

    #[test]
    fn clones_share_entries() {
        let store = MemoryCredentialStore::new();
        let clone = store.clone();
        clone.set("10.0.0.1", "admin", "hunter2").unwrap();
        assert!(!store.is_empty());
        assert!(!format!("{:?}", store).contains("hunter2"));
    }
}
