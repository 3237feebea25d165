//! Shared command context for CLI commands

use branchbot::config::{LoadedConfig, load_config};
use branchbot::env::Environment;
use branchbot::error::Result;
use std::path::{Path, PathBuf};

/// Setup shared by every command:
/// - Resolve the working directory
/// - Snapshot the process environment
/// - Load the configuration file (or defaults)
pub struct CommandContext {
    /// Directory the command was started in
    pub working_dir: PathBuf,
    /// Environment snapshot, taken once
    pub env: Environment,
    /// Configuration and where it came from
    pub loaded: LoadedConfig,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(working_dir: PathBuf, config_path: Option<&Path>) -> Result<Self> {
        let loaded = load_config(config_path, &working_dir)?;
        Ok(Self {
            working_dir,
            env: Environment::from_process(),
            loaded,
        })
    }

    /// Resolve `path` against the working directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }
}
