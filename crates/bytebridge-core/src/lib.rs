//! ByteBridge Core - Domain types and port definitions
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `RemoteId`, `FileName`, `SyncPath`, `RemoteFileRecord`
//! - **Port definitions** - Traits for adapters: `IRemoteFileStore`, `ILocalFolder`
//! - **Configuration** - YAML config file shared by the daemon and adapters
//!
//! # Architecture
//!
//! The domain module has no I/O. Ports define trait interfaces that the
//! store and sync crates implement or consume.

pub mod config;
pub mod domain;
pub mod ports;
