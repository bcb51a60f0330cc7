//! Local folder adapter (secondary/driven adapter)
//!
//! Implements [`ILocalFolder`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Atomic writes**: Downloads are written to `.<name>.bytebridge-partial`
//!   and renamed into place. The watcher ignores exactly that pattern, so a
//!   half-written download never triggers an upload while user files such as
//!   `draft.partial` are still synced.
//! - **Flat folder**: Only direct children of the root are addressed; names
//!   are validated [`FileName`]s and cannot escape the root.

use std::io;
use std::path::{Path, PathBuf};

use bytebridge_core::domain::newtypes::{FileName, SyncPath};
use bytebridge_core::ports::ILocalFolder;
use tracing::{debug, instrument};

/// Suffix of the hidden temporary file used while writing a download
pub const PARTIAL_SUFFIX: &str = ".bytebridge-partial";

/// Whether `file_name` is one of our own in-progress download files
pub fn is_partial_name(file_name: &str) -> bool {
    file_name
        .strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(PARTIAL_SUFFIX))
        .is_some_and(|target| !target.is_empty())
}

/// Adapter that bridges the [`ILocalFolder`] port to a real directory
#[derive(Debug, Clone)]
pub struct LocalFolderAdapter {
    root: SyncPath,
}

impl LocalFolderAdapter {
    /// Create an adapter for the folder at `root`
    #[must_use]
    pub fn new(root: SyncPath) -> Self {
        Self { root }
    }

    fn partial_path(&self, name: &FileName) -> PathBuf {
        self.root
            .as_path()
            .join(format!(".{}{PARTIAL_SUFFIX}", name.as_str()))
    }
}

#[async_trait::async_trait]
impl ILocalFolder for LocalFolderAdapter {
    fn root(&self) -> &SyncPath {
        &self.root
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    #[instrument(skip(self), fields(name = %name))]
    async fn contains(&self, name: &FileName) -> io::Result<bool> {
        tokio::fs::try_exists(self.root.child(name)).await
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        debug!("reading file");
        let data = tokio::fs::read(path).await?;
        debug!(bytes = data.len(), "file read complete");
        Ok(data)
    }

    // Write to a sibling temp file so the rename stays on one filesystem.
    #[instrument(skip(self, data), fields(name = %name, bytes = data.len()))]
    async fn write_file(&self, name: &FileName, data: &[u8]) -> io::Result<()> {
        let target = self.root.child(name);
        let tmp_path = self.partial_path(name);

        debug!(?tmp_path, "writing to temporary file");
        if let Err(e) = tokio::fs::write(&tmp_path, data).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        debug!("renaming temporary file to target");
        if let Err(e) = tokio::fs::rename(&tmp_path, &target).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e);
        }

        debug!("write complete");
        Ok(())
    }
}
