//! ByteBridge file store HTTP client
//!
//! Typed client for the store's file collection resource:
//!
//! | Operation | Request                                  |
//! |-----------|------------------------------------------|
//! | list      | `GET {files}`                            |
//! | download  | `GET {files}/{id}`                       |
//! | upload    | `POST {files}` (multipart/form-data)     |
//! | delete    | `DELETE {files}/{id}`                    |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytebridge_store::client::StoreClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = StoreClient::with_base_url("http://localhost:5191")?;
//! for record in client.list_files().await? {
//!     println!("{} {}", record.id, record.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use bytebridge_core::config::StoreConfig;
use bytebridge_core::domain::{RemoteFileRecord, RemoteId};
use bytebridge_core::ports::StoreError;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::records::FileRecordDto;

/// Default resource path of the file collection
pub const DEFAULT_FILES_PATH: &str = "/api/v1/File";

/// Multipart part carrying the file contents
const FILE_PART: &str = "FileAttachment";

/// Multipart text field carrying the file name
const NAME_FIELD: &str = "Name";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error bodies longer than this are cut before being put into errors
const MAX_ERROR_BODY: usize = 512;

// ============================================================================
// StoreClient
// ============================================================================

/// HTTP client for the remote file store
///
/// Wraps `reqwest::Client` with the collection URL and a request timeout.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    /// Collection URL without trailing slash, e.g. `http://localhost:5191/api/v1/File`
    files_url: String,
}

impl StoreClient {
    /// Creates a client for an explicit collection URL
    ///
    /// # Arguments
    /// * `files_url` - Full URL of the file collection
    /// * `timeout` - Per-request timeout
    pub fn new(files_url: impl Into<String>, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        let files_url: String = files_url.into();
        Ok(Self {
            client,
            files_url: files_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from the `store` config section
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        Self::new(config.files_url(), config.timeout())
    }

    /// Creates a client for a store at `base_url` using the default resource path
    /// (useful for testing)
    pub fn with_base_url(base_url: impl AsRef<str>) -> Result<Self, StoreError> {
        let url = format!(
            "{}{}",
            base_url.as_ref().trim_end_matches('/'),
            DEFAULT_FILES_PATH
        );
        Self::new(url, DEFAULT_TIMEOUT)
    }

    /// Returns the collection URL requests are made against
    pub fn files_url(&self) -> &str {
        &self.files_url
    }

    /// Creates a request builder for the collection or one of its members
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `id` - Member id; `None` addresses the collection itself
    pub fn request(&self, method: Method, id: Option<RemoteId>) -> RequestBuilder {
        let url = match id {
            Some(id) => format!("{}/{}", self.files_url, id),
            None => self.files_url.clone(),
        };
        self.client.request(method, url)
    }

    /// Fetches the full listing of files
    pub async fn list_files(&self) -> Result<Vec<RemoteFileRecord>, StoreError> {
        debug!("Fetching file listing");

        let response = self
            .request(Method::GET, None)
            .send()
            .await
            .map_err(network_error)?;
        let response = ensure_success(response, "list files").await?;

        let body = response.bytes().await.map_err(network_error)?;
        let records: Vec<FileRecordDto> = serde_json::from_slice(&body)
            .map_err(|e| StoreError::InvalidResponse(format!("file listing: {e}")))?;

        debug!(count = records.len(), "Fetched file listing");
        Ok(records.into_iter().map(RemoteFileRecord::from).collect())
    }

    /// Downloads a file by its id
    ///
    /// # Returns
    /// The raw file contents
    pub async fn download_file(&self, id: RemoteId) -> Result<Vec<u8>, StoreError> {
        debug!(id = %id, "Downloading file");

        let response = self
            .request(Method::GET, Some(id))
            .send()
            .await
            .map_err(network_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id));
        }
        let response = ensure_success(response, &format!("download file {id}")).await?;

        let bytes = response.bytes().await.map_err(network_error)?;

        debug!(id = %id, bytes = bytes.len(), "Downloaded file");
        Ok(bytes.to_vec())
    }

    /// Uploads a file as `multipart/form-data`
    ///
    /// The body carries the contents in a `FileAttachment` part (with `name`
    /// as its filename) and the name again in a `Name` text field.
    ///
    /// # Returns
    /// The created record if the store echoed one back as JSON
    pub async fn upload_file(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> Result<Option<RemoteFileRecord>, StoreError> {
        let size = data.len();
        debug!(name, bytes = size, "Uploading file");

        let part = Part::bytes(data).file_name(name.to_string());
        let form = Form::new()
            .part(FILE_PART, part)
            .text(NAME_FIELD, name.to_string());

        let response = self
            .request(Method::POST, None)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;
        let response = ensure_success(response, &format!("upload {name}")).await?;

        let body = response.bytes().await.map_err(network_error)?;
        if body.is_empty() {
            return Ok(None);
        }

        match serde_json::from_slice::<FileRecordDto>(&body) {
            Ok(dto) => Ok(Some(dto.into())),
            Err(e) => {
                debug!(name, error = %e, "Upload response carried no record");
                Ok(None)
            }
        }
    }

    /// Deletes a file by its id
    pub async fn delete_file(&self, id: RemoteId) -> Result<(), StoreError> {
        debug!(id = %id, "Deleting file");

        let response = self
            .request(Method::DELETE, Some(id))
            .send()
            .await
            .map_err(network_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id));
        }
        ensure_success(response, &format!("delete file {id}")).await?;

        debug!(id = %id, "File deleted");
        Ok(())
    }
}

fn network_error(err: reqwest::Error) -> StoreError {
    if err.is_decode() {
        return StoreError::InvalidResponse(err.to_string());
    }
    if err.is_timeout() {
        return StoreError::Network(format!("request timed out: {err}"));
    }
    StoreError::Network(err.to_string())
}

/// Passes 2xx responses through and turns anything else into `StoreError::Status`
async fn ensure_success(response: Response, context: &str) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }

    warn!(status = status.as_u16(), context, "Store returned error status");
    Err(StoreError::Status {
        status: status.as_u16(),
        context: context.to_string(),
        body,
    })
}
