//! HttpFileStore - IRemoteFileStore implementation over HTTP
//!
//! Thin adapter that delegates each port method to [`StoreClient`] and adds
//! tracing spans around the calls.

use async_trait::async_trait;
use tracing::instrument;

use bytebridge_core::domain::{RemoteFileRecord, RemoteId};
use bytebridge_core::ports::{IRemoteFileStore, StoreError};

use crate::client::StoreClient;

/// Remote file store reached through [`StoreClient`]
#[derive(Debug, Clone)]
pub struct HttpFileStore {
    client: StoreClient,
}

impl HttpFileStore {
    pub fn new(client: StoreClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IRemoteFileStore for HttpFileStore {
    #[instrument(skip(self), fields(url = %self.client.files_url()))]
    async fn list(&self) -> Result<Vec<RemoteFileRecord>, StoreError> {
        self.client.list_files().await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn download(&self, id: RemoteId) -> Result<Vec<u8>, StoreError> {
        self.client.download_file(id).await
    }

    #[instrument(skip(self, data), fields(bytes = data.len()))]
    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> Result<Option<RemoteFileRecord>, StoreError> {
        self.client.upload_file(name, data).await
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: RemoteId) -> Result<(), StoreError> {
        self.client.delete_file(id).await
    }
}
