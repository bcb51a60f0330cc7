//! Configuration module for ByteBridge.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//! Every section and field is optional in the file; missing values take their
//! defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for ByteBridge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local folder kept in sync. A leading `~` is expanded to the home directory.
    pub root: PathBuf,
    /// Seconds between remote polling cycles.
    pub poll_interval: u64,
    /// Milliseconds to wait after a local change before deciding to upload.
    pub settle_delay_ms: u64,
    /// Seconds during which repeated changes to the same file are ignored.
    pub debounce_window: u64,
}

/// Remote file store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Scheme, host and port of the store, e.g. `http://localhost:5191`.
    pub base_url: String,
    /// Path of the file collection resource on the store.
    pub files_path: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/bytebridge/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bytebridge")
            .join("config.yaml")
    }
}

impl SyncConfig {
    /// `root` with a leading `~` replaced by the home directory.
    pub fn expanded_root(&self) -> PathBuf {
        expand_tilde(&self.root)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.debounce_window)
    }
}

impl StoreConfig {
    /// Full URL of the file collection, without a trailing slash.
    pub fn files_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.files_path.trim_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

// ---------------------------------------------------------------------------
// Config::default()
// ---------------------------------------------------------------------------

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Documents")
                .join("SyncFolder"),
            poll_interval: 30,
            settle_delay_ms: 500,
            debounce_window: 2,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5191".to_string(),
            files_path: "/api/v1/File".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.poll_interval"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. The sync root is not
    /// required to exist; the daemon creates it on startup.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if !self.sync.expanded_root().is_absolute() {
            errors.push(ValidationError {
                field: "sync.root".into(),
                message: format!("must be an absolute path: {}", self.sync.root.display()),
            });
        }
        if self.sync.poll_interval == 0 {
            errors.push(ValidationError {
                field: "sync.poll_interval".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.settle_delay_ms == 0 {
            errors.push(ValidationError {
                field: "sync.settle_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.debounce_window == 0 {
            errors.push(ValidationError {
                field: "sync.debounce_window".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- store ---
        match url::Url::parse(&self.store.base_url) {
            Ok(u) if matches!(u.scheme(), "http" | "https") => {}
            Ok(u) => errors.push(ValidationError {
                field: "store.base_url".into(),
                message: format!("unsupported scheme '{}'; expected http or https", u.scheme()),
            }),
            Err(e) => errors.push(ValidationError {
                field: "store.base_url".into(),
                message: format!("not a valid URL: {e}"),
            }),
        }
        if !self.store.files_path.starts_with('/') {
            errors.push(ValidationError {
                field: "store.files_path".into(),
                message: "must start with '/'".into(),
            });
        }
        if self.store.timeout_secs == 0 {
            errors.push(ValidationError {
                field: "store.timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use bytebridge_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .sync_root(PathBuf::from("/home/user/SyncFolder"))
///     .sync_poll_interval(60)
///     .store_base_url("http://files.local:8080")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Start from an already loaded configuration.
    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    // --- sync ---

    pub fn sync_root(mut self, root: PathBuf) -> Self {
        self.config.sync.root = root;
        self
    }

    pub fn sync_poll_interval(mut self, seconds: u64) -> Self {
        self.config.sync.poll_interval = seconds;
        self
    }

    pub fn sync_settle_delay_ms(mut self, millis: u64) -> Self {
        self.config.sync.settle_delay_ms = millis;
        self
    }

    pub fn sync_debounce_window(mut self, seconds: u64) -> Self {
        self.config.sync.debounce_window = seconds;
        self
    }

    // --- store ---

    pub fn store_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.store.base_url = url.into();
        self
    }

    pub fn store_files_path(mut self, path: impl Into<String>) -> Self {
        self.config.store.files_path = path.into();
        self
    }

    pub fn store_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.store.timeout_secs = seconds;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn logging_json(mut self, json: bool) -> Self {
        self.config.logging.json = json;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
