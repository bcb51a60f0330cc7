//! Remote file metadata
//!
//! A [`RemoteFileRecord`] is the store's view of one file. Only `name` takes
//! part in matching against the local folder; the rest is carried through
//! for logging and future use.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::RemoteId;

/// Remote-authoritative metadata for one stored file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFileRecord {
    pub id: RemoteId,
    /// Join key against the local folder. Kept as the raw string so that
    /// listings with unusable names can still be reported.
    pub name: String,
    pub path: Option<String>,
    /// Content digest as reported by the store. Not consulted for matching.
    pub hash: Option<String>,
    pub extension: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
}

impl RemoteFileRecord {
    /// Minimal record with just an id and a name
    #[must_use]
    pub fn new(id: RemoteId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            path: None,
            hash: None,
            extension: None,
            created_on: None,
            updated_on: None,
        }
    }

    /// Whether this record refers to a file the store actually holds
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.id.is_assigned()
    }
}

/// Parse a store timestamp
///
/// Accepts RFC 3339 and offset-less ISO-8601 (`2024-05-01T10:00:00.123`),
/// the latter read as UTC. Returns `None` for anything else.
#[must_use]
pub fn parse_store_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
