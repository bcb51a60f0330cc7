//! Domain entities
//!
//! - Newtypes for identifiers and validated names/paths
//! - Remote file metadata
//! - Domain-specific error types

pub mod errors;
pub mod newtypes;
pub mod record;

pub use errors::DomainError;
pub use newtypes::*;
pub use record::{parse_store_timestamp, RemoteFileRecord};
