// # Credential Store Trait
//
// Keeps router passwords out of the settings file.
//
// ## Implementations
//
// - In-memory: [`crate::credentials::MemoryCredentialStore`]
// - OS keychain: provided by the `routesync` binary
//
// Entries are keyed by (service, user). routesync uses the router address as
// the service and the router username as the user.

use crate::Error;

/// Trait for secret storage backends
///
/// # Security
///
/// Implementations MUST NOT log secret values.
pub trait CredentialStore: Send + Sync {
    /// Fetch the secret for `(service, user)`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(secret))`: An entry exists
    /// - `Ok(None)`: No entry exists (not an error)
    /// - `Err(Error)`: The backend itself failed
    fn get(&self, service: &str, user: &str) -> Result<Option<String>, Error>;

    /// Store (or replace) the secret for `(service, user)`
    fn set(&self, service: &str, user: &str, secret: &str) -> Result<(), Error>;
}
