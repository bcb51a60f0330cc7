//! Remote file store port (driven/secondary port)
//!
//! The sync engine talks to the store only through [`IRemoteFileStore`].
//! The HTTP implementation lives in `bytebridge-store`.
//!
//! ## Design Notes
//!
//! - Errors are typed ([`StoreError`]) rather than `anyhow::Result` because the
//!   engine branches on "not found" versus transport failures.
//! - Uses `#[async_trait]` for async trait methods.

use thiserror::Error;

use crate::domain::newtypes::RemoteId;
use crate::domain::record::RemoteFileRecord;

// ============================================================================
// StoreError
// ============================================================================

/// Failures reported by a remote store adapter
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection, TLS or timeout failure before a response was received
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status
    #[error("{context} failed with status {status}: {body}")]
    Status {
        status: u16,
        context: String,
        body: String,
    },

    /// The requested file does not exist on the store
    #[error("remote file {0} not found")]
    NotFound(RemoteId),

    /// A response arrived but could not be decoded
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Whether this is a lookup miss rather than a transport failure
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

// ============================================================================
// IRemoteFileStore
// ============================================================================

/// Catalog of remote files keyed by store-assigned id
///
/// ## Implementation Notes
///
/// - `upload` carries no idempotency key: calling it twice creates two records.
/// - Stores are not required to return the created record; `upload` yields
///   `None` in that case.
#[async_trait::async_trait]
pub trait IRemoteFileStore: Send + Sync {
    /// Fetch the full listing of remote files, in store order
    async fn list(&self) -> Result<Vec<RemoteFileRecord>, StoreError>;

    /// Download the full contents of a file
    ///
    /// # Errors
    /// `StoreError::NotFound` if the store has no file with this id
    async fn download(&self, id: RemoteId) -> Result<Vec<u8>, StoreError>;

    /// Upload a new file under `name`
    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> Result<Option<RemoteFileRecord>, StoreError>;

    /// Delete a file by id
    async fn delete(&self, id: RemoteId) -> Result<(), StoreError>;

    /// Find the first record in the listing whose name equals `name`
    async fn find_by_name(&self, name: &str) -> Result<Option<RemoteFileRecord>, StoreError> {
        let records = self.list().await?;
        Ok(records.into_iter().find(|r| r.name == name))
    }
}
