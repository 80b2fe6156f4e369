//! Error types for the dockdns system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dockdns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the dockdns system
#[derive(Error, Debug)]
pub enum Error {
    /// Workload inventory-related errors
    #[error("inventory error: {0}")]
    Inventory(String),

    /// No workload is known under the given identifier
    #[error("no workload found for id '{0}'")]
    WorkloadNotFound(String),

    /// A workload carries no name the registry could use
    #[error("workload '{0}' has no name")]
    WorkloadUnnamed(String),

    /// A workload has no address on any network shared with the server
    #[error("workload '{0}' has no address on a shared network")]
    NoSharedNetwork(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Network and file I/O errors
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// DNS server errors (socket registration, shutdown)
    #[error("dns server error: {0}")]
    Server(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an inventory error
    pub fn inventory(msg: impl Into<String>) -> Self {
        Self::Inventory(msg.into())
    }

    /// Create a "workload not found" error
    pub fn workload_not_found(id: impl Into<String>) -> Self {
        Self::WorkloadNotFound(id.into())
    }

    /// Create an "unnamed workload" error
    pub fn workload_unnamed(id: impl Into<String>) -> Self {
        Self::WorkloadUnnamed(id.into())
    }

    /// Create a "no shared network" error
    pub fn no_shared_network(id: impl Into<String>) -> Self {
        Self::NoSharedNetwork(id.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a DNS server error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
