//! ByteBridge Store - HTTP client for the remote file store
//!
//! ## Modules
//!
//! - [`client`] - HTTP client for the file collection resource
//! - [`provider`] - [`IRemoteFileStore`](bytebridge_core::ports::IRemoteFileStore) adapter

pub mod client;
pub mod provider;
mod records;

pub use client::StoreClient;
pub use provider::HttpFileStore;
