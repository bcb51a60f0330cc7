//! Local folder port (driven/secondary port)
//!
//! Flat view of the sync folder: entries are addressed by base name, except
//! for the existence probes used on raw watcher paths.

use std::io;
use std::path::Path;

use crate::domain::newtypes::{FileName, SyncPath};

/// Operations the engine performs against the local sync folder
///
/// ## Implementation Notes
///
/// - `write_file` must not leave a partially written file visible under
///   `name` if it fails midway.
/// - `contains` reports presence only; no content comparison is made.
#[async_trait::async_trait]
pub trait ILocalFolder: Send + Sync {
    /// The folder being synchronized
    fn root(&self) -> &SyncPath;

    /// Whether anything exists at `path`
    async fn exists(&self, path: &Path) -> bool;

    /// Whether `path` exists and is a regular file
    async fn is_file(&self, path: &Path) -> bool;

    /// Whether the folder has an entry named `name`
    async fn contains(&self, name: &FileName) -> io::Result<bool>;

    /// Read the full contents of the file at `path`
    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or replace `name` inside the folder with `data`
    async fn write_file(&self, name: &FileName, data: &[u8]) -> io::Result<()>;
}
