//! Policy configuration
//!
//! A single TOML file describes the search-path rules, the trigger condition
//! and the retry policy. Every section is optional and falls back to the
//! defaults of the original CI workflow.

mod storage;

pub use storage::{
    CONFIG_FILE, LoadedConfig, discover_config, load_config, load_config_file, render_config,
    user_config_path,
};

use crate::backend::GitBackend;
use crate::paths::PathRule;
use crate::trigger::{Condition, RetryPolicy};
use crate::types::InterpreterVersion;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Search-path section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Value for `{python_version}` placeholders
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter_version: Option<InterpreterVersion>,
    /// Rules, in search precedence order
    pub rules: Vec<PathRule>,
}

/// Git backend section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitConfig {
    /// Remote to fetch from and push to (None = local branches only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    /// Push updated branches back to the remote
    pub push: bool,
    /// Committer name for merge commits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Committer email for merge commits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            remote: Some("origin".to_string()),
            push: true,
            user_name: None,
            user_email: None,
        }
    }
}

impl GitConfig {
    /// Build a git backend for the checkout at `repo_dir`
    pub fn backend(&self, repo_dir: impl Into<PathBuf>) -> GitBackend {
        let backend = GitBackend::new(repo_dir)
            .with_remote(self.remote.clone())
            .with_push(self.push);
        match (&self.user_name, &self.user_email) {
            (Some(name), Some(email)) => backend.with_identity(name, email),
            _ => backend,
        }
    }
}

/// Complete branchbot configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Search-path rules
    pub paths: PathsConfig,
    /// When to update pull requests
    pub trigger: Condition,
    /// How to retry conflicting merges
    pub retry: RetryPolicy,
    /// How merges are performed
    pub git: GitConfig,
}
