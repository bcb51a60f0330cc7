//! ByteBridge Daemon - Background folder synchronization service
//!
//! The daemon keeps one local folder and the remote file store in agreement:
//! - Local changes are pushed as they happen (filesystem notifications)
//! - The full remote listing is polled periodically and missing files pulled
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! On startup the daemon loads its YAML configuration, applies command line
//! overrides, creates the sync folder if needed, and starts the
//! [`ReconciliationEngine`]. Both engine loops are stopped by a
//! `CancellationToken` that is triggered on receipt of SIGTERM or SIGINT.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bytebridge_core::config::{Config, ConfigBuilder};
use bytebridge_core::domain::SyncPath;
use bytebridge_core::ports::{ILocalFolder, IRemoteFileStore};
use bytebridge_store::{HttpFileStore, StoreClient};
use bytebridge_sync::{FileWatcher, LocalFolderAdapter, ReconciliationEngine};

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "bytebridged",
    version,
    about = "Keeps a local folder in sync with a ByteBridge file store"
)]
struct Args {
    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Folder to keep in sync (overrides sync.root)
    #[arg(long, value_name = "PATH")]
    folder: Option<PathBuf>,

    /// Base URL of the file store (overrides store.base_url)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit log lines as JSON
    #[arg(long)]
    json_logs: bool,
}

/// Loads the config file named by `args` (or the default one) and applies
/// the command line overrides
///
/// A missing file means defaults. A file that exists but cannot be parsed is
/// an error.
fn resolve_config(args: &Args) -> Result<Config> {
    let path = args.config.clone().unwrap_or_else(Config::default_path);

    let config = if path.exists() {
        Config::load(&path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?
    } else {
        Config::default()
    };

    apply_overrides(config, args)
}

fn apply_overrides(config: Config, args: &Args) -> Result<Config> {
    let mut builder = ConfigBuilder::from_config(config);

    if let Some(folder) = &args.folder {
        builder = builder.sync_root(absolute_folder(folder)?);
    }
    if let Some(url) = &args.base_url {
        builder = builder.store_base_url(url.clone());
    }
    if args.json_logs {
        builder = builder.logging_json(true);
    }
    match args.verbose {
        0 => {}
        1 => builder = builder.logging_level("debug"),
        _ => builder = builder.logging_level("trace"),
    }

    builder.build_validated().map_err(|errors| {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow!("Invalid configuration:\n  {}", details.join("\n  "))
    })
}

/// Relative `--folder` values are taken relative to the working directory
fn absolute_folder(folder: &Path) -> Result<PathBuf> {
    if folder.is_absolute() || folder.starts_with("~") {
        return Ok(folder.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(folder))
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ============================================================================
// DaemonService
// ============================================================================

/// Owns the configuration and the shutdown token for one daemon run
struct DaemonService {
    config: Config,
    /// Token for signalling graceful shutdown to all async tasks
    shutdown: CancellationToken,
}

impl DaemonService {
    fn new(config: Config, shutdown: CancellationToken) -> Self {
        Self { config, shutdown }
    }

    /// Runs until the shutdown token is cancelled
    ///
    /// 1. Creates the sync folder if it does not exist
    /// 2. Builds the store client and the folder adapter
    /// 3. Attaches the change notifier to the folder
    /// 4. Starts the engine and waits for both of its loops to stop
    async fn run(&self) -> Result<()> {
        let root_path = self.config.sync.expanded_root();
        tokio::fs::create_dir_all(&root_path)
            .await
            .with_context(|| format!("Failed to create sync folder {}", root_path.display()))?;
        let root = SyncPath::new(root_path.clone()).context("Invalid sync folder")?;

        let client =
            StoreClient::from_config(&self.config.store).context("Failed to build store client")?;
        info!(url = %client.files_url(), "Using file store");

        let store: Arc<dyn IRemoteFileStore + Send + Sync> = Arc::new(HttpFileStore::new(client));
        let folder: Arc<dyn ILocalFolder + Send + Sync> = Arc::new(LocalFolderAdapter::new(root));

        let (mut watcher, events) = FileWatcher::new()?;
        watcher.watch(&root_path)?;

        let engine = ReconciliationEngine::from_config(store, folder, &self.config.sync);
        let handle = engine.start(events, self.shutdown.clone());

        handle.join().await;

        // Dropping the watcher closes the event channel.
        drop(watcher);
        Ok(())
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    init_tracing(&config.logging.level, config.logging.json);

    info!(
        root = %config.sync.expanded_root().display(),
        poll_interval_secs = config.sync.poll_interval,
        "ByteBridge daemon starting (bytebridged)"
    );

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(config, shutdown_token);
    let result = service.run().await;

    match &result {
        Ok(()) => info!("ByteBridge daemon shut down gracefully"),
        Err(e) => error!(error = %e, "ByteBridge daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
