//! Per-path suppression of repeated upload attempts
//!
//! Editors often emit several write events for one save. The [`DebounceGate`]
//! remembers when each path last had an upload attempt and turns away further
//! attempts inside the window. It performs no I/O and has no locking of its
//! own; the owning [`UploadCoordinator`](crate::upload::UploadCoordinator)
//! keeps it behind its lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::Instant;

/// Default window during which a second attempt for the same path is suppressed
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_secs(2);

/// Table of last upload attempts keyed by absolute path
///
/// Entries are never removed, so the table grows with the number of distinct
/// paths seen during the process lifetime.
#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    last_uploaded_at: HashMap<PathBuf, Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_uploaded_at: HashMap::new(),
        }
    }

    /// Returns false if an attempt for `path` was recorded less than one
    /// window before `now`. Does not mutate the table.
    pub fn should_proceed(&self, path: &Path, now: Instant) -> bool {
        match self.last_uploaded_at.get(path) {
            Some(last) => now.saturating_duration_since(*last) >= self.window,
            None => true,
        }
    }

    /// Records an upload attempt for `path` at `now`
    pub fn record(&mut self, path: &Path, now: Instant) {
        self.last_uploaded_at.insert(path.to_path_buf(), now);
    }

    /// Number of distinct paths with a recorded attempt
    pub fn len(&self) -> usize {
        self.last_uploaded_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_uploaded_at.is_empty()
    }
}

impl Default for DebounceGate {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_WINDOW)
    }
}
