// # Resolver Trait
//
// Turns a domain name into the set of addresses routes should point at.
//
// ## Implementations
//
// - System resolver: [`crate::resolver::SystemResolver`]

use async_trait::async_trait;
use std::net::IpAddr;

use crate::error::ResolveError;

/// Trait for DNS resolution
///
/// # Contract
///
/// - A successful lookup returns at least one address
/// - An empty answer is reported as [`ResolveError::NotFound`], never as `Ok(vec![])`
/// - Addresses are unique, in the order the resolver produced them
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve `name` to its current addresses (IPv4 and IPv6)
    async fn resolve(&self, name: &str) -> Result<Vec<IpAddr>, ResolveError>;
}
