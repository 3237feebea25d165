//! Git process backend

use crate::backend::MergeBackend;
use crate::error::{Error, Result};
use crate::types::MergeOutcome;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

/// Performs merges by running `git` in a local checkout
#[derive(Debug, Clone)]
pub struct GitBackend {
    repo_dir: PathBuf,
    remote: Option<String>,
    push: bool,
    identity: Option<(String, String)>,
}

impl GitBackend {
    /// Backend operating on local branches in `repo_dir`
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: None,
            push: false,
            identity: None,
        }
    }

    /// Fetch from and resolve branches against `remote`
    #[must_use]
    pub fn with_remote(mut self, remote: Option<String>) -> Self {
        self.remote = remote;
        self
    }

    /// Push the updated head branch back to the remote
    #[must_use]
    pub fn with_push(mut self, push: bool) -> Self {
        self.push = push;
        self
    }

    /// Committer identity for merge commits (name, email)
    #[must_use]
    pub fn with_identity(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.identity = Some((name.into(), email.into()));
        self
    }

    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, "running git");
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo_dir).env("LC_ALL", "C");
        if let Some((name, email)) = &self.identity {
            cmd.arg("-c")
                .arg(format!("user.name={name}"))
                .arg("-c")
                .arg(format!("user.email={email}"));
        }
        cmd.args(args)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git {}: {e}", args.join(" "))))
    }

    async fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(Error::Git(format!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn has_unmerged_paths(&self) -> Result<bool> {
        let files = self
            .run_ok(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(!files.trim().is_empty())
    }
}

#[async_trait]
impl MergeBackend for GitBackend {
    async fn merge(&self, head: &str, base: &str) -> Result<MergeOutcome> {
        let base_ref = match &self.remote {
            Some(remote) => {
                self.run_ok(&["fetch", "--prune", remote]).await?;
                let remote_head = format!("{remote}/{head}");
                self.run_ok(&["checkout", "-B", head, &remote_head]).await?;
                format!("{remote}/{base}")
            }
            None => {
                self.run_ok(&["checkout", head]).await?;
                base.to_string()
            }
        };

        let output = self.run(&["merge", "--no-edit", &base_ref]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            if stdout.contains("CONFLICT") || self.has_unmerged_paths().await? {
                if let Err(e) = self.run_ok(&["merge", "--abort"]).await {
                    warn!(error = %e, "failed to abort conflicting merge");
                }
                let message = stdout
                    .lines()
                    .filter(|l| l.starts_with("CONFLICT"))
                    .collect::<Vec<_>>()
                    .join("\n");
                return Ok(MergeOutcome::Conflict { message });
            }
            return Err(Error::Git(format!(
                "git merge {base_ref} failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if stdout.contains("Already up to date") || stdout.contains("Already up-to-date") {
            return Ok(MergeOutcome::UpToDate);
        }

        let sha = self.run_ok(&["rev-parse", "HEAD"]).await?.trim().to_string();

        if self.push {
            if let Some(remote) = &self.remote {
                let refspec = format!("HEAD:refs/heads/{head}");
                self.run_ok(&["push", remote, &refspec]).await?;
            }
        }

        Ok(MergeOutcome::Merged { sha })
    }
}
