// # routesync-core
//
// Core library for keeping MikroTik RouterOS routes in sync with DNS.
//
// ## Architecture Overview
//
// - **RouterApi**: Trait for running commands on a router session
// - **Resolver**: Trait for resolving a domain to its current addresses
// - **CredentialStore**: Trait for keeping router passwords out of the settings file
// - **RouteRepository**: Typed print/add/remove on `/ip/route`, with dry-run support
// - **Reconciler**: Replaces a domain's routes with one per resolved address,
//   and lists/refreshes the routes it manages
//
// ## Ownership Convention
//
// A route belongs to routesync when its comment is a hostname. That hostname
// is the domain the route was created for, and is what a refresh re-resolves.

pub mod traits;
pub mod address;
pub mod route;
pub mod repository;
pub mod engine;
pub mod resolver;
pub mod credentials;
pub mod config;
pub mod settings;
pub mod error;

// Re-export core types for convenience
pub use traits::{Command, CredentialStore, Reply, Resolver, RouterApi};
pub use address::{DEFAULT_API_PORT, RouterAddress};
pub use route::{RouteRecord, is_hostname, sanitize_domain};
pub use repository::{Applied, RouteRepository};
pub use engine::{ListReport, OutcomeStatus, Phase, ReconcileReport, Reconciler, RefreshOutcome, RouteOutcome};
pub use resolver::SystemResolver;
pub use config::{Action, RunConfig, RunOptions, Settings};
pub use settings::SettingsFile;
pub use error::{Error, ResolveError, Result};
