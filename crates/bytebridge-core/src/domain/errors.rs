//! Domain error types
//!
//! Validation failures raised while constructing domain values from
//! untrusted input (local paths, remote listings, configuration).

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid path format or content
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// A name that cannot be used as a single component inside the sync folder
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// Remote ID is not one the store would have assigned
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),
}
