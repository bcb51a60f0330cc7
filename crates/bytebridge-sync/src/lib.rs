//! ByteBridge Sync - Reconciliation engine
//!
//! Keeps a local folder and the remote file store in agreement by merging two
//! signal sources:
//! - a periodic full listing of the store (pull, authoritative)
//! - local filesystem change events (push, immediate but noisy)
//!
//! ## Modules
//!
//! - [`watcher`] - `notify`-based change notifier for the sync folder
//! - [`debounce`] - Per-path rate limiting of upload attempts
//! - [`upload`] - Upload and deletion decisions for single local changes
//! - [`poll`] - Listing-driven download of files missing locally
//! - [`engine`] - The two concurrently running loops
//! - [`filesystem`] - Local folder adapter (atomic writes)

pub mod debounce;
pub mod engine;
pub mod filesystem;
pub mod poll;
pub mod upload;
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use engine::{EngineHandle, ReconciliationEngine};
pub use filesystem::LocalFolderAdapter;
pub use poll::{PollFailure, PollReconciler, PollReport};
pub use upload::{RemovalOutcome, UploadCoordinator, UploadOutcome};
pub use watcher::{ChangeEvent, ChangeKind, FileWatcher};

use thiserror::Error;

use bytebridge_core::domain::errors::DomainError;
use bytebridge_core::ports::StoreError;

/// Errors that can occur during synchronization operations
///
/// None of these are fatal to the engine; each one ends a single event or a
/// single file within a poll cycle.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local file vanished or could not be read or written
    #[error("IO error: {0}")]
    LocalIo(#[from] std::io::Error),

    /// The remote store failed or rejected the request
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A domain-level error propagated from bytebridge-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
