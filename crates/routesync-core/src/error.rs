//! Error types for routesync
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for routesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a DNS lookup produced no addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The name does not exist or has no address records
    #[error("no addresses found for {0}")]
    NotFound(String),

    /// The lookup itself failed (resolver unreachable, malformed name, ...)
    #[error("lookup of {name} failed: {message}")]
    Lookup {
        /// Name that was looked up
        name: String,
        /// Underlying resolver message
        message: String,
    },
}

/// Core error type for routesync
#[derive(Error, Debug)]
pub enum Error {
    /// Address parsing, transport setup or login failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// DNS resolution failed
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolveError),

    /// The router rejected or failed a command
    #[error("Query error: {0}")]
    Query(String),

    /// A router operation was called with unusable arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential store errors
    #[error("Credential store error: {0}")]
    Credential(String),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

}

impl Error {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a query error
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a credential store error
    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential(msg.into())
    }
}
