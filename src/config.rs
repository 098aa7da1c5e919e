use crate::core::decision_log::DEFAULT_LOG_FILE;
use crate::core::error::{Error, Result};
use crate::core::loader::{DEFAULT_PACKETS_FILE, DEFAULT_RULES_FILE};
use crate::utils::get_data_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// When to emit ANSI colors in terminal output
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Default,
    strum::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Color only when stdout is a terminal
    #[default]
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "always")]
    Always,
    #[strum(serialize = "never")]
    Never,
}

impl ColorMode {
    /// Resolves the mode against whether stdout is a terminal
    pub fn enabled(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Input/output locations and output preferences for a simulation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default = "default_rules_path")]
    pub rules_path: PathBuf,
    #[serde(default = "default_packets_path")]
    pub packets_path: PathBuf,
    #[serde(default = "default_log_path")]
    pub log_path: PathBuf,
    #[serde(default)]
    pub color: ColorMode,
    /// Write a `.sha256` sidecar next to the decision log
    #[serde(default = "default_true")]
    pub write_checksum: bool,
    /// Record runs in the audit log (state directory)
    #[serde(default = "default_true")]
    pub audit_enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules_path: default_rules_path(),
            packets_path: default_packets_path(),
            log_path: default_log_path(),
            color: ColorMode::default(),
            write_checksum: true,
            audit_enabled: true,
        }
    }
}

fn default_rules_path() -> PathBuf {
    PathBuf::from(DEFAULT_RULES_FILE)
}

fn default_packets_path() -> PathBuf {
    PathBuf::from(DEFAULT_PACKETS_FILE)
}

fn default_log_path() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_FILE)
}

fn default_true() -> bool {
    true
}

/// Default config location: `<data_dir>/config.json`
pub fn default_config_path() -> Option<PathBuf> {
    get_data_dir().map(|mut path| {
        path.push("config.json");
        path
    })
}

/// Loads the app config.
///
/// With an explicit `path`, a missing file yields defaults but an unreadable
/// or unparsable one is an error. Without one, `<data_dir>/config.json` is
/// tried and any problem falls back to defaults with a warning.
///
/// # Async
/// Uses `tokio::fs` for non-blocking I/O.
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = path {
        return match tokio::fs::read_to_string(path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| Error::Config(format!("{}: {e}", path.display()))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(e) => Err(Error::Config(format!("{}: {e}", path.display()))),
        };
    }

    if let Some(path) = default_config_path()
        && let Ok(json) = tokio::fs::read_to_string(&path).await
    {
        match serde_json::from_str::<AppConfig>(&json) {
            Ok(config) => return Ok(config),
            Err(e) => tracing::warn!("Ignoring invalid config {}: {}", path.display(), e),
        }
    }
    Ok(AppConfig::default())
}

/// Saves the app config to disk using an atomic write pattern.
/// 1. Creates the parent directory if needed.
/// 2. Writes to a temporary file.
/// 3. Sets restrictive permissions (0o600).
/// 4. Atomically renames to the target path.
///
/// # Async
/// Uses `tokio::fs` for non-blocking I/O.
pub async fn save_config(path: &Path, config: &AppConfig) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(config)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    #[cfg(unix)]
    {
        use tokio::fs::OpenOptions;
        use tokio::io::AsyncWriteExt;

        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .mode(0o600) // Set permissions BEFORE any data is written
            .open(&temp_path)
            .await?;

        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    #[cfg(not(unix))]
    {
        use tokio::io::AsyncWriteExt;

        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.sync_all().await?;
    }

    tokio::fs::rename(temp_path, path).await
}
