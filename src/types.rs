//! Core types for branchbot

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of repository event that may trigger an update
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventKind {
    /// A push to a ref
    Push,
    /// Any other event name (never matches a push condition)
    Other(String),
}

impl From<String> for EventKind {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("push") {
            Self::Push
        } else {
            Self::Other(value)
        }
    }
}

impl From<&str> for EventKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<EventKind> for String {
    fn from(value: EventKind) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Push => write!(f, "push"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A repository event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event kind
    pub kind: EventKind,
    /// Branch the event refers to (None for tag pushes and similar)
    pub branch: Option<String>,
}

impl Event {
    /// A push to the named branch
    pub fn push(branch: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Push,
            branch: Some(branch.into()),
        }
    }
}

/// PR state (open, closed, merged)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// PR is open and can be updated
    Open,
    /// PR was closed without merging
    Closed,
    /// PR was merged
    Merged,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// A pull request candidate for an automated update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Head branch name (the branch that gets updated)
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// Label names attached to the PR
    pub labels: Vec<String>,
    /// Current state of the PR
    pub state: PrState,
}

impl PullRequest {
    /// Whether the PR carries the given label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Result of a single merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Base was merged into head, producing a new commit
    Merged {
        /// SHA of the resulting head commit
        sha: String,
    },
    /// Head already contains base
    UpToDate,
    /// The merge conflicted and was aborted
    Conflict {
        /// Conflict details reported by the backend
        message: String,
    },
}

impl MergeOutcome {
    /// Whether this outcome is a conflict
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Interpreter version substituted into path templates (`major.minor`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InterpreterVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl InterpreterVersion {
    /// Create a version from its parts
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl std::fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for InterpreterVersion {
    type Err = Error;

    /// Parse `X.Y` or `X.Y.Z` (patch and later components are ignored)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::Config(format!("invalid interpreter version '{s}'"));
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for InterpreterVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InterpreterVersion> for String {
    fn from(value: InterpreterVersion) -> Self {
        value.to_string()
    }
}
