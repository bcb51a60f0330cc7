//! In-memory doubles of both ports for unit tests

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use bytebridge_core::domain::{FileName, RemoteFileRecord, RemoteId, SyncPath};
use bytebridge_core::ports::{ILocalFolder, IRemoteFileStore, StoreError};

// ============================================================================
// FakeStore
// ============================================================================

#[derive(Default)]
struct StoreState {
    records: Vec<RemoteFileRecord>,
    contents: HashMap<i64, Vec<u8>>,
    next_id: i64,
    list_calls: Vec<Instant>,
    downloads: Vec<RemoteId>,
    uploads: Vec<(String, Vec<u8>, Instant)>,
    deletes: Vec<RemoteId>,
    failing_lists: usize,
    failing_downloads: HashSet<i64>,
    fail_uploads: bool,
}

/// Remote store double that records every call
pub struct FakeStore {
    state: Mutex<StoreState>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Every operation sleeps for `latency` while counted as in flight
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: Mutex::new(StoreState {
                next_id: 1,
                ..StoreState::default()
            }),
            latency,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Adds a record (and its contents) as if it had been uploaded earlier
    pub fn seed(&self, id: i64, name: &str, contents: &[u8]) {
        let mut s = self.lock();
        s.records
            .push(RemoteFileRecord::new(RemoteId::from_raw(id), name));
        s.contents.insert(id, contents.to_vec());
        s.next_id = s.next_id.max(id + 1);
    }

    pub fn fail_next_lists(&self, n: usize) {
        self.lock().failing_lists = n;
    }

    pub fn fail_download(&self, id: i64) {
        self.lock().failing_downloads.insert(id);
    }

    pub fn fail_uploads(&self) {
        self.lock().fail_uploads = true;
    }

    pub fn list_calls(&self) -> Vec<Instant> {
        self.lock().list_calls.clone()
    }

    pub fn downloads(&self) -> Vec<RemoteId> {
        self.lock().downloads.clone()
    }

    pub fn uploads(&self) -> Vec<(String, Vec<u8>, Instant)> {
        self.lock().uploads.clone()
    }

    pub fn upload_names(&self) -> Vec<String> {
        self.lock().uploads.iter().map(|(n, _, _)| n.clone()).collect()
    }

    pub fn deletes(&self) -> Vec<RemoteId> {
        self.lock().deletes.clone()
    }

    pub fn has_record(&self, name: &str) -> bool {
        self.lock().records.iter().any(|r| r.name == name)
    }

    /// Highest number of operations that were ever in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl IRemoteFileStore for FakeStore {
    async fn list(&self) -> Result<Vec<RemoteFileRecord>, StoreError> {
        self.lock().list_calls.push(Instant::now());
        self.enter().await;
        let result = {
            let mut s = self.lock();
            if s.failing_lists > 0 {
                s.failing_lists -= 1;
                Err(StoreError::Network("connection refused".into()))
            } else {
                Ok(s.records.clone())
            }
        };
        self.leave();
        result
    }

    async fn download(&self, id: RemoteId) -> Result<Vec<u8>, StoreError> {
        self.enter().await;
        let result = {
            let mut s = self.lock();
            s.downloads.push(id);
            if s.failing_downloads.contains(&id.as_i64()) {
                Err(StoreError::Status {
                    status: 500,
                    context: format!("download file {id}"),
                    body: String::new(),
                })
            } else {
                s.contents
                    .get(&id.as_i64())
                    .cloned()
                    .ok_or(StoreError::NotFound(id))
            }
        };
        self.leave();
        result
    }

    async fn upload(
        &self,
        name: &str,
        data: Vec<u8>,
    ) -> Result<Option<RemoteFileRecord>, StoreError> {
        self.enter().await;
        let result = {
            let mut s = self.lock();
            s.uploads.push((name.to_string(), data.clone(), Instant::now()));
            if s.fail_uploads {
                Err(StoreError::Status {
                    status: 500,
                    context: format!("upload {name}"),
                    body: String::new(),
                })
            } else {
                let id = s.next_id;
                s.next_id += 1;
                let record = RemoteFileRecord::new(RemoteId::from_raw(id), name);
                s.records.push(record.clone());
                s.contents.insert(id, data);
                Ok(Some(record))
            }
        };
        self.leave();
        result
    }

    async fn delete(&self, id: RemoteId) -> Result<(), StoreError> {
        self.enter().await;
        let result = {
            let mut s = self.lock();
            s.deletes.push(id);
            let before = s.records.len();
            s.records.retain(|r| r.id != id);
            if s.records.len() == before {
                Err(StoreError::NotFound(id))
            } else {
                s.contents.remove(&id.as_i64());
                Ok(())
            }
        };
        self.leave();
        result
    }
}

// ============================================================================
// MemoryFolder
// ============================================================================

/// Flat in-memory stand-in for the sync folder
pub struct MemoryFolder {
    root: SyncPath,
    files: Mutex<HashMap<String, Vec<u8>>>,
    dirs: Mutex<HashSet<String>>,
    failing_writes: Mutex<HashSet<String>>,
}

impl MemoryFolder {
    pub fn new() -> Self {
        Self {
            root: SyncPath::new(PathBuf::from("/sync")).unwrap(),
            files: Mutex::new(HashMap::new()),
            dirs: Mutex::new(HashSet::new()),
            failing_writes: Mutex::new(HashSet::new()),
        }
    }

    /// Absolute path of `name` inside the folder
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.as_path().join(name)
    }

    pub fn put(&self, name: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(name.to_string(), data.to_vec());
    }

    pub fn remove(&self, name: &str) {
        self.files.lock().unwrap().remove(name);
    }

    pub fn mkdir(&self, name: &str) {
        self.dirs.lock().unwrap().insert(name.to_string());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn fail_writes_to(&self, name: &str) {
        self.failing_writes.lock().unwrap().insert(name.to_string());
    }

    fn entry_name<'a>(&self, path: &'a Path) -> Option<&'a str> {
        if !self.root.is_direct_child(path) {
            return None;
        }
        path.file_name().and_then(|n| n.to_str())
    }
}

#[async_trait]
impl ILocalFolder for MemoryFolder {
    fn root(&self) -> &SyncPath {
        &self.root
    }

    async fn exists(&self, path: &Path) -> bool {
        match self.entry_name(path) {
            Some(name) => {
                self.files.lock().unwrap().contains_key(name)
                    || self.dirs.lock().unwrap().contains(name)
            }
            None => false,
        }
    }

    async fn is_file(&self, path: &Path) -> bool {
        self.entry_name(path)
            .is_some_and(|name| self.files.lock().unwrap().contains_key(name))
    }

    async fn contains(&self, name: &FileName) -> io::Result<bool> {
        let key = name.as_str();
        Ok(self.files.lock().unwrap().contains_key(key) || self.dirs.lock().unwrap().contains(key))
    }

    async fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.entry_name(path)
            .and_then(|name| self.get(name))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    async fn write_file(&self, name: &FileName, data: &[u8]) -> io::Result<()> {
        if self.failing_writes.lock().unwrap().contains(name.as_str()) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.put(name.as_str(), data);
        Ok(())
    }
}
