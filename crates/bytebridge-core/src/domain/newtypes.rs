//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for identifiers and values
//! that cross the local/remote boundary. Each newtype ensures data validity
//! at construction time.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// Remote identifiers
// ============================================================================

/// Store-assigned identifier of a remote file
///
/// The store hands out positive integers. Anything `<= 0` means the record
/// was never assigned an id and is treated as absent by lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteId(i64);

impl RemoteId {
    /// Create a RemoteId, rejecting unassigned values
    ///
    /// # Errors
    /// Returns `DomainError::InvalidRemoteId` if `id <= 0`
    pub fn new(id: i64) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::InvalidRemoteId(id.to_string()));
        }
        Ok(Self(id))
    }

    /// Wrap a raw value as received from the wire, without validation
    #[must_use]
    pub const fn from_raw(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Whether the store actually assigned this id
    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.0 > 0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// File names
// ============================================================================

/// A base name usable as a single entry inside the sync folder
///
/// This is the join key between local and remote state. It must be:
/// - Non-empty
/// - Not `.` or `..`
/// - Free of path separators and NUL bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Create a new FileName
    ///
    /// # Errors
    /// Returns `DomainError::InvalidFileName` if the name could escape the
    /// sync folder or does not name a single entry
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();

        if name.is_empty() || name == "." || name == ".." {
            return Err(DomainError::InvalidFileName(name));
        }

        if name.contains(['/', '\\', '\0']) {
            return Err(DomainError::InvalidFileName(name));
        }

        Ok(Self(name))
    }

    /// Extract the base name of a path
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path has no final component
    /// or that component is not valid UTF-8
    pub fn from_path(path: &Path) -> Result<Self, DomainError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DomainError::InvalidPath(path.display().to_string()))?;
        Self::new(name)
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FileName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FileName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Path types
// ============================================================================

/// A validated absolute path, used for the sync folder root
///
/// SyncPath ensures the path is:
/// - Absolute (starts with /)
/// - Normalized (no . or .. components)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathBuf", into = "PathBuf")]
pub struct SyncPath(PathBuf);

impl SyncPath {
    /// Create a new SyncPath, validating it is absolute
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPath` if the path is not absolute
    pub fn new(path: PathBuf) -> Result<Self, DomainError> {
        if !path.is_absolute() {
            return Err(DomainError::InvalidPath(format!(
                "Path must be absolute: {}",
                path.display()
            )));
        }

        // The path might not exist yet, so no fs::canonicalize()
        let normalized = Self::normalize_path(&path)?;
        Ok(Self(normalized))
    }

    /// Get the inner path
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Path of a direct child entry
    #[must_use]
    pub fn child(&self, name: &FileName) -> PathBuf {
        self.0.join(name.as_str())
    }

    /// Whether `path` is a direct child of this directory
    #[must_use]
    pub fn is_direct_child(&self, path: &Path) -> bool {
        path.parent() == Some(self.0.as_path())
    }

    fn normalize_path(path: &Path) -> Result<PathBuf, DomainError> {
        use std::path::Component;

        let mut normalized = PathBuf::new();

        for component in path.components() {
            match component {
                Component::Prefix(p) => normalized.push(p.as_os_str()),
                Component::RootDir => normalized.push("/"),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(DomainError::InvalidPath(
                            "Path escapes root via ..".to_string(),
                        ));
                    }
                }
                Component::Normal(c) => normalized.push(c),
            }
        }

        Ok(normalized)
    }
}

impl Display for SyncPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl TryFrom<PathBuf> for SyncPath {
    type Error = DomainError;

    fn try_from(path: PathBuf) -> Result<Self, Self::Error> {
        Self::new(path)
    }
}

impl From<SyncPath> for PathBuf {
    fn from(sync_path: SyncPath) -> Self {
        sync_path.0
    }
}

impl AsRef<Path> for SyncPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
