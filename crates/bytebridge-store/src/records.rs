//! Wire representation of file records
//!
//! The store serializes records in camelCase. Only `id` and `name` are
//! required; everything else is tolerated as missing or null.

use serde::Deserialize;

use bytebridge_core::domain::{parse_store_timestamp, RemoteFileRecord, RemoteId};

/// A file record as returned by `GET /api/v1/File` and `POST /api/v1/File`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileRecordDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub updated_on: Option<String>,
}

impl From<FileRecordDto> for RemoteFileRecord {
    fn from(dto: FileRecordDto) -> Self {
        Self {
            id: RemoteId::from_raw(dto.id),
            name: dto.name,
            path: dto.path,
            hash: dto.hash,
            extension: dto.extension,
            created_on: dto.created_on.as_deref().and_then(parse_store_timestamp),
            updated_on: dto.updated_on.as_deref().and_then(parse_store_timestamp),
        }
    }
}
