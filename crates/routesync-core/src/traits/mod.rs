//! Core traits for routesync
//!
//! This module defines the abstract interfaces the reconciler is built on.
//!
//! - [`RouterApi`]: Execute commands against a router session
//! - [`Resolver`]: Resolve domain names to addresses
//! - [`CredentialStore`]: Store router passwords outside the settings file

pub mod router_api;
pub mod resolver;
pub mod credentials;

pub use router_api::{Command, Reply, RouterApi};
pub use resolver::Resolver;
pub use credentials::CredentialStore;
