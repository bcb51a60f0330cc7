//! Upload and deletion decisions for single local changes
//!
//! [`UploadCoordinator`] turns one local change into at most one remote
//! upload, and one local removal into at most one remote delete. A single
//! lock, which also guards the [`DebounceGate`], serializes every decision
//! the coordinator makes, including decisions for unrelated files.
//!
//! ## Upload decision
//!
//! ```text
//! lock ─→ settle delay ─→ still a file? ─→ debounced? ─→ name on remote? ─→ upload
//!                              │no              │yes            │yes           │
//!                              ▼                ▼               ▼              ▼
//!                           Vanished        Debounced     AlreadyRemote   record attempt
//! ```
//!
//! Modifications to a file whose name already exists remotely are skipped:
//! matching is by name only and the store offers no update operation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use bytebridge_core::domain::{FileName, RemoteFileRecord, RemoteId};
use bytebridge_core::ports::{ILocalFolder, IRemoteFileStore};

use crate::debounce::DebounceGate;
use crate::SyncError;

/// Default pause before deciding, letting a burst of events for one save arrive
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// Result of [`UploadCoordinator::handle_change`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file was sent; carries the new record when the store returned one
    Uploaded(Option<RemoteFileRecord>),
    /// The path was gone or was not a regular file once the settle delay passed
    Vanished,
    /// Another attempt for the same path happened inside the debounce window
    Debounced,
    /// A remote record with the same name already exists
    AlreadyRemote(RemoteId),
}

/// Result of [`UploadCoordinator::handle_removal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    Deleted(RemoteId),
    /// No remote record carries the removed file's name
    NotOnRemote,
}

/// Decides whether single local changes are pushed to the store
pub struct UploadCoordinator {
    store: Arc<dyn IRemoteFileStore + Send + Sync>,
    folder: Arc<dyn ILocalFolder + Send + Sync>,
    settle_delay: Duration,
    /// The coordinator-wide lock; holding it is required for any decision
    gate: Mutex<DebounceGate>,
}

impl UploadCoordinator {
    pub fn new(
        store: Arc<dyn IRemoteFileStore + Send + Sync>,
        folder: Arc<dyn ILocalFolder + Send + Sync>,
        settle_delay: Duration,
        debounce_window: Duration,
    ) -> Self {
        Self {
            store,
            folder,
            settle_delay,
            gate: Mutex::new(DebounceGate::new(debounce_window)),
        }
    }

    /// Handles a create or write of `path`
    ///
    /// # Errors
    /// Local read failures and store failures abandon the attempt. The attempt
    /// is still recorded in the debounce table if the upload itself was tried.
    pub async fn handle_change(&self, path: &Path) -> Result<UploadOutcome, SyncError> {
        let mut gate = self.gate.lock().await;

        tokio::time::sleep(self.settle_delay).await;

        if !self.folder.is_file(path).await {
            debug!(path = %path.display(), "Skipping upload: not a regular file anymore");
            return Ok(UploadOutcome::Vanished);
        }

        if !gate.should_proceed(path, Instant::now()) {
            debug!(path = %path.display(), "Skipping upload: debounced");
            return Ok(UploadOutcome::Debounced);
        }

        let name = FileName::from_path(path)?;

        if let Some(existing) = self.store.find_by_name(name.as_str()).await? {
            if existing.is_assigned() {
                debug!(
                    path = %path.display(),
                    id = %existing.id,
                    "Skipping upload: name already present on remote"
                );
                return Ok(UploadOutcome::AlreadyRemote(existing.id));
            }
        }

        let result = self.upload(path, &name).await;
        gate.record(path, Instant::now());
        result
    }

    async fn upload(&self, path: &Path, name: &FileName) -> Result<UploadOutcome, SyncError> {
        let data = self.folder.read_file(path).await?;
        let size = data.len();

        let record = self.store.upload(name.as_str(), data).await?;

        match &record {
            Some(r) => info!(name = %name, bytes = size, id = %r.id, "Uploaded file"),
            None => info!(name = %name, bytes = size, "Uploaded file"),
        }
        Ok(UploadOutcome::Uploaded(record))
    }

    /// Handles the removal of `path` by deleting the remote record with the
    /// same base name
    pub async fn handle_removal(&self, path: &Path) -> Result<RemovalOutcome, SyncError> {
        let _gate = self.gate.lock().await;

        let name = FileName::from_path(path)?;

        let record = match self.store.find_by_name(name.as_str()).await? {
            Some(r) if r.is_assigned() => r,
            _ => {
                info!(name = %name, "Nothing to delete on remote");
                return Ok(RemovalOutcome::NotOnRemote);
            }
        };

        self.store.delete(record.id).await?;
        info!(name = %name, id = %record.id, "Deleted remote file");
        Ok(RemovalOutcome::Deleted(record.id))
    }

    /// Number of paths with a recorded upload attempt
    pub async fn tracked_paths(&self) -> usize {
        self.gate.lock().await.len()
    }
}
