//! Change notifier for the sync folder
//!
//! Provides a [`FileWatcher`] that wraps the `notify` crate to monitor the sync
//! folder (non-recursively), converting raw OS events into [`ChangeEvent`]
//! values delivered on a bounded channel.
//!
//! ## Architecture
//!
//! ```text
//! inotify / kqueue / FSEvents
//!       │
//!       ▼
//!  FileWatcher  ──→  mpsc::channel  ──→  ReconciliationEngine event loop
//! ```
//!
//! A rename is reported as [`ChangeKind::RenameAway`] on the source path and
//! as [`ChangeKind::Create`] on the destination. Some platforms cannot tell a
//! rename source from a removal, so the consumer decides with an existence
//! check.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::event::{ModifyKind, RenameMode};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::filesystem::is_partial_name;

/// Capacity of the event channel between the OS callback and the engine
const EVENT_CHANNEL_CAPACITY: usize = 1024;

// ============================================================================
// ChangeEvent
// ============================================================================

/// What happened to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A new entry appeared (including as a rename destination)
    Create,
    /// File contents changed
    Write,
    /// The entry was removed
    Remove,
    /// The entry was renamed away from this path; it may or may not still exist
    RenameAway,
}

/// A filesystem change for one path inside the watched folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub path: PathBuf,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ============================================================================
// FileWatcher
// ============================================================================

/// Watches the sync folder for changes using the OS-native mechanism
///
/// Dropping the watcher stops event delivery and closes the channel.
///
/// ## Usage
///
/// ```ignore
/// let (mut watcher, rx) = FileWatcher::new()?;
/// watcher.watch(Path::new("/home/user/Documents/SyncFolder"))?;
/// // rx.recv().await to get events
/// ```
pub struct FileWatcher {
    watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Creates a new `FileWatcher`
    ///
    /// # Returns
    /// The watcher and the receiver that yields [`ChangeEvent`] values.
    ///
    /// # Errors
    /// Returns an error if the underlying OS watcher cannot be created
    pub fn new() -> Result<(Self, mpsc::Receiver<ChangeEvent>)> {
        let (tx, rx) = mpsc::channel::<ChangeEvent>(EVENT_CHANNEL_CAPACITY);

        info!("Initializing file watcher");

        let watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| match res {
                Ok(event) => {
                    for change in map_notify_event(&event) {
                        if let Err(e) = tx.blocking_send(change) {
                            warn!(error = %e, "Failed to send change event (receiver dropped)");
                        }
                    }
                }
                Err(err) => {
                    error!(error = %err, "File watcher error");
                }
            },
            notify::Config::default(),
        )
        .context("Failed to create file watcher")?;

        Ok((Self { watcher }, rx))
    }

    /// Starts watching a directory (its direct entries only)
    ///
    /// # Errors
    /// Returns an error if the path cannot be watched (e.g., does not exist,
    /// insufficient permissions, or inotify watch limit reached)
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Starting watch");

        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch path: {}", path.display()))?;

        Ok(())
    }

    /// Stops watching a directory
    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        info!(path = %path.display(), "Stopping watch");

        self.watcher
            .unwatch(path)
            .with_context(|| format!("Failed to unwatch path: {}", path.display()))?;

        Ok(())
    }
}

// ============================================================================
// Event mapping - notify::Event → ChangeEvent
// ============================================================================

/// Converts a `notify::Event` into zero or more [`ChangeEvent`]s
///
/// Maps the notify event kinds as follows:
/// - `Create(*)` -> `Create`
/// - `Modify(Data(*))`, `Modify(Any)`, `Modify(Other)` -> `Write`
/// - `Modify(Name(From))`, `Modify(Name(Any))`, `Modify(Name(Other))` -> `RenameAway`
/// - `Modify(Name(To))` -> `Create`
/// - `Remove(*)` -> `Remove`
///
/// `Modify(Name(Both))` is dropped because backends that emit it have already
/// reported the `From` and `To` halves. Metadata-only changes and access
/// events are ignored, as are the temporary files used for atomic writes.
pub(crate) fn map_notify_event(event: &notify::Event) -> Vec<ChangeEvent> {
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Create,

        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => ChangeKind::Create,
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            debug!(paths = ?event.paths, "Ignoring paired rename event");
            return Vec::new();
        }
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::RenameAway,

        EventKind::Modify(ModifyKind::Metadata(_)) => {
            debug!(paths = ?event.paths, "Ignoring metadata change");
            return Vec::new();
        }
        EventKind::Modify(_) => ChangeKind::Write,

        EventKind::Remove(_) => ChangeKind::Remove,

        _ => {
            debug!(kind = ?event.kind, "Ignoring event kind");
            return Vec::new();
        }
    };

    event
        .paths
        .iter()
        .filter(|path| !is_partial_file(path))
        .map(|path| {
            debug!(path = %path.display(), ?kind, "Mapped notify event");
            ChangeEvent::new(kind, path.clone())
        })
        .collect()
}

fn is_partial_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(is_partial_name)
}
