//! Reconciliation engine
//!
//! The [`ReconciliationEngine`] runs the two independent sync paths as
//! separate tokio tasks:
//!
//! ```text
//! FileWatcher ──→ mpsc::Receiver ──→ event loop ──→ UploadCoordinator
//!                                                    (change / removal)
//!
//! interval timer ──────────────────→ poll loop  ──→ PollReconciler
//! ```
//!
//! Events are consumed one at a time. The poll loop runs a cycle as soon as
//! it starts and then once per poll interval. Nothing orders the two paths
//! relative to each other.
//!
//! Only events for direct children of the sync root are dispatched. Events
//! on the root itself (the folder being deleted or moved) and on anything
//! deeper are dropped.
//!
//! A `RenameAway` whose path is gone is handled as a removal. If the path
//! still exists it is handled as a change, which is a departure from
//! ignoring it: the settle delay, the debounce window and the remote name
//! lookup keep that from causing duplicate uploads.
//!
//! Errors stay local to the event or cycle that produced them; both loops
//! keep running until the shutdown token is cancelled. The event loop also
//! stops when the notifier channel closes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use bytebridge_core::config::SyncConfig;
use bytebridge_core::ports::{ILocalFolder, IRemoteFileStore};

use crate::poll::PollReconciler;
use crate::upload::{RemovalOutcome, UploadCoordinator, UploadOutcome};
use crate::watcher::{ChangeEvent, ChangeKind};
use crate::SyncError;

/// Default time between two poll cycles
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Wires the change notifier and the poll timer to the sync components
pub struct ReconciliationEngine {
    coordinator: Arc<UploadCoordinator>,
    poller: Arc<PollReconciler>,
    folder: Arc<dyn ILocalFolder + Send + Sync>,
    poll_interval: Duration,
}

/// Join handles of the two engine tasks
#[derive(Debug)]
pub struct EngineHandle {
    event_task: JoinHandle<()>,
    poll_task: JoinHandle<()>,
}

impl EngineHandle {
    /// Waits for both loops to finish
    pub async fn join(self) {
        let (events, poll) = tokio::join!(self.event_task, self.poll_task);
        if let Err(e) = events {
            warn!(error = %e, "Event loop task ended abnormally");
        }
        if let Err(e) = poll {
            warn!(error = %e, "Poll loop task ended abnormally");
        }
    }
}

impl ReconciliationEngine {
    pub fn new(
        coordinator: Arc<UploadCoordinator>,
        poller: Arc<PollReconciler>,
        folder: Arc<dyn ILocalFolder + Send + Sync>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            coordinator,
            poller,
            folder,
            poll_interval,
        }
    }

    /// Builds the coordinator and the poller from the `sync` config section
    pub fn from_config(
        store: Arc<dyn IRemoteFileStore + Send + Sync>,
        folder: Arc<dyn ILocalFolder + Send + Sync>,
        config: &SyncConfig,
    ) -> Self {
        let coordinator = Arc::new(UploadCoordinator::new(
            Arc::clone(&store),
            Arc::clone(&folder),
            config.settle_delay(),
            config.debounce_window(),
        ));
        let poller = Arc::new(PollReconciler::new(store, Arc::clone(&folder)));
        Self::new(coordinator, poller, folder, config.poll_interval())
    }

    pub fn coordinator(&self) -> &Arc<UploadCoordinator> {
        &self.coordinator
    }

    /// Spawns the event loop and the poll loop
    ///
    /// Both loops exit once `shutdown` is cancelled. A decision or cycle that
    /// is already running is allowed to finish first.
    pub fn start(
        self,
        events: mpsc::Receiver<ChangeEvent>,
        shutdown: CancellationToken,
    ) -> EngineHandle {
        info!(
            root = %self.folder.root(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "Starting reconciliation engine"
        );

        let engine = Arc::new(self);

        let event_task = tokio::spawn({
            let engine = Arc::clone(&engine);
            let shutdown = shutdown.clone();
            async move { engine.run_event_loop(events, shutdown).await }
        });

        let poll_task = tokio::spawn(async move { engine.run_poll_loop(shutdown).await });

        EngineHandle {
            event_task,
            poll_task,
        }
    }

    async fn run_event_loop(
        &self,
        mut events: mpsc::Receiver<ChangeEvent>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, event loop stopping");
                    break;
                }

                event = events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.dispatch(&event).await {
                            warn!(
                                path = %event.path.display(),
                                kind = ?event.kind,
                                error = %e,
                                "Failed to handle change"
                            );
                        }
                    }
                    None => {
                        info!("Change channel closed, event loop stopping");
                        break;
                    }
                },
            }
        }
    }

    /// Routes one change event to the coordinator
    async fn dispatch(&self, event: &ChangeEvent) -> Result<(), SyncError> {
        if !self.folder.root().is_direct_child(event.path()) {
            debug!(path = %event.path.display(), kind = ?event.kind, "Ignoring change outside sync folder");
            return Ok(());
        }

        debug!(path = %event.path.display(), kind = ?event.kind, "Dispatching change");

        match event.kind {
            ChangeKind::Create | ChangeKind::Write => self.change(event).await,
            ChangeKind::Remove => self.removal(event).await,
            // Some backends report the source of a rename like a removal and
            // others like a modification. Whether the path is still there decides.
            ChangeKind::RenameAway => {
                if self.folder.exists(event.path()).await {
                    self.change(event).await
                } else {
                    self.removal(event).await
                }
            }
        }
    }

    async fn change(&self, event: &ChangeEvent) -> Result<(), SyncError> {
        match self.coordinator.handle_change(event.path()).await? {
            UploadOutcome::Uploaded(_) => {}
            outcome => debug!(path = %event.path.display(), ?outcome, "No upload"),
        }
        Ok(())
    }

    async fn removal(&self, event: &ChangeEvent) -> Result<(), SyncError> {
        if let RemovalOutcome::NotOnRemote = self.coordinator.handle_removal(event.path()).await? {
            debug!(path = %event.path.display(), "Removed file was never on remote");
        }
        Ok(())
    }

    async fn run_poll_loop(&self, shutdown: CancellationToken) {
        let mut timer = tokio::time::interval(self.poll_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("Shutdown requested, poll loop stopping");
                    break;
                }

                _ = timer.tick() => self.poll_once().await,
            }
        }
    }

    async fn poll_once(&self) {
        match self.poller.run_cycle().await {
            Ok(report) => {
                info!(
                    listed = report.listed,
                    downloaded = report.downloaded,
                    present = report.present,
                    failed = report.failures.len(),
                    duration_ms = report.duration_ms,
                    "Poll cycle complete"
                );
            }
            Err(e) => {
                warn!(error = %e, "Poll cycle failed, retrying at next interval");
            }
        }
    }
}
