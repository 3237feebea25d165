//! Locating, loading and rendering the configuration file.

use super::Config;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config filename looked up in the working directory.
pub const CONFIG_FILE: &str = "branchbot.toml";

/// Directory name under the user config directory.
const APP_DIR: &str = "branchbot";

/// Filename inside the user config directory.
const USER_CONFIG_FILE: &str = "config.toml";

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    /// Parsed configuration
    pub config: Config,
    /// File it was read from (None = built-in defaults)
    pub source: Option<PathBuf>,
}

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(USER_CONFIG_FILE))
}

/// Find a config file: `<working_dir>/branchbot.toml`, then the user file.
pub fn discover_config(working_dir: &Path) -> Option<PathBuf> {
    let local = working_dir.join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    user_config_path().filter(|path| path.is_file())
}

/// Load and parse a specific config file.
pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the file is discovered; if
/// none is found the built-in defaults are used.
pub fn load_config(explicit: Option<&Path>, working_dir: &Path) -> Result<LoadedConfig> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(working_dir),
    };

    let Some(path) = source else {
        debug!("no config file found, using defaults");
        return Ok(LoadedConfig::default());
    };

    debug!(path = %path.display(), "loading config");
    let config = load_config_file(&path)?;
    Ok(LoadedConfig {
        config,
        source: Some(path),
    })
}

/// Render a configuration as TOML.
pub fn render_config(config: &Config) -> Result<String> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;

    Ok(format!("# branchbot configuration\n\n{content}"))
}
