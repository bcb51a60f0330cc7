//! Port definitions (hexagonal architecture interfaces)
//!
//! ## Ports Overview
//!
//! - [`IRemoteFileStore`] - Remote catalog: list, download, upload, delete
//! - [`ILocalFolder`] - The local sync folder

pub mod local_folder;
pub mod remote_store;

pub use local_folder::ILocalFolder;
pub use remote_store::{IRemoteFileStore, StoreError};
