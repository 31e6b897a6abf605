//! Router passwords in the OS credential store
//!
//! Entries are keyed by service = router address and user = router
//! username, so one machine can remember several routers.

use routesync_core::traits::CredentialStore;
use routesync_core::{Error, Result};

/// Credential store backed by the platform keychain
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringCredentialStore;

impl KeyringCredentialStore {
    fn entry(service: &str, user: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, user).map_err(|e| {
            Error::credential(format!("cannot open keychain entry for {}@{}: {}", user, service, e))
        })
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self, service: &str, user: &str) -> Result<Option<String>> {
        match Self::entry(service, user)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::credential(e.to_string())),
        }
    }

    fn set(&self, service: &str, user: &str, secret: &str) -> Result<()> {
        Self::entry(service, user)?
            .set_password(secret)
            .map_err(|e| Error::credential(e.to_string()))
    }
}
