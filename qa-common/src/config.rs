//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "QA_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "qa-report.db";

/// Optional settings read from `config.toml`
///
/// Every field is optional; command-line and environment values take
/// precedence over anything found here.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct TomlConfig {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub query_timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the platform config file if one exists
    ///
    /// A missing file is not an error. A malformed file is logged and ignored
    /// so the service still starts on defaults.
    pub fn load() -> Option<Self> {
        let path = config_file_path()?;
        match Self::from_file(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring unreadable config file: {}", e);
                None
            }
        }
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: Option<&TomlConfig>,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(root_folder) = toml_config.and_then(|c| c.root_folder.clone()) {
        return root_folder;
    }

    default_root_folder()
}

/// Path of the report database inside a root folder
pub fn database_path(root_folder: &Path) -> PathBuf {
    root_folder.join(DATABASE_FILE)
}

/// Locate the platform config file
///
/// Linux checks `~/.config/qa-report/config.toml` then
/// `/etc/qa-report/config.toml`; other platforms use the user config dir.
fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("qa-report").join("config.toml"));

    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/qa-report/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("qa-report"))
        .unwrap_or_else(|| PathBuf::from("./qa_report_data"))
}
