//! Listing-driven download of files missing locally
//!
//! One [`PollReconciler::run_cycle`] fetches the full remote listing and, in
//! listing order, downloads every record whose name is not present in the
//! local folder. This is a presence sync only: a local file with the same
//! name is never compared or replaced, and nothing is ever deleted.
//!
//! Per name, across cycles: `Unknown → RemoteOnly → Downloaded → ignored`.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use bytebridge_core::domain::{FileName, RemoteFileRecord, RemoteId};
use bytebridge_core::ports::{ILocalFolder, IRemoteFileStore};

use crate::SyncError;

/// Summary of one poll cycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Records in the remote listing
    pub listed: usize,
    /// Files written to the local folder
    pub downloaded: usize,
    /// Records whose name was already present locally
    pub present: usize,
    /// Records that could not be brought down, with the reason
    pub failures: Vec<PollFailure>,
    pub duration_ms: u64,
}

impl PollReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A single record that failed within an otherwise completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollFailure {
    pub name: String,
    pub error: String,
}

/// Brings the local folder up to date with the remote listing
pub struct PollReconciler {
    store: Arc<dyn IRemoteFileStore + Send + Sync>,
    folder: Arc<dyn ILocalFolder + Send + Sync>,
}

impl PollReconciler {
    pub fn new(
        store: Arc<dyn IRemoteFileStore + Send + Sync>,
        folder: Arc<dyn ILocalFolder + Send + Sync>,
    ) -> Self {
        Self { store, folder }
    }

    /// Runs one cycle
    ///
    /// # Errors
    /// Only a failed listing fails the cycle. Per-record failures are
    /// collected into [`PollReport::failures`] and the cycle moves on.
    #[tracing::instrument(skip(self))]
    pub async fn run_cycle(&self) -> Result<PollReport, SyncError> {
        let start = Instant::now();
        let records = self.store.list().await?;

        let mut report = PollReport {
            listed: records.len(),
            ..PollReport::default()
        };

        for record in &records {
            match self.reconcile(record).await {
                Ok(true) => report.downloaded += 1,
                Ok(false) => report.present += 1,
                Err(e) => {
                    warn!(name = %record.name, id = %record.id, error = %e, "Failed to bring file down");
                    report.failures.push(PollFailure {
                        name: record.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    /// Downloads `record` if its name is absent locally; returns whether it did
    async fn reconcile(&self, record: &RemoteFileRecord) -> Result<bool, SyncError> {
        let name = FileName::new(record.name.clone())?;

        if self.folder.contains(&name).await? {
            debug!(name = %name, "File already present locally");
            return Ok(false);
        }

        let id = RemoteId::new(record.id.as_i64())?;

        let data = self.store.download(id).await?;
        self.folder.write_file(&name, &data).await?;

        info!(name = %name, id = %record.id, bytes = data.len(), "Downloaded file");
        Ok(true)
    }
}
