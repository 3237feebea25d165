//! Declarative trigger conditions and retry policy

use crate::types::{EventKind, PullRequest};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Label requirements a pull request must satisfy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelFilter {
    /// PR must carry at least one of these (empty = no PR qualifies)
    pub required: BTreeSet<String>,
    /// PR must carry none of these
    pub excluded: BTreeSet<String>,
}

impl LabelFilter {
    /// Whether `pr` carries at least one required label
    pub fn has_required(&self, pr: &PullRequest) -> bool {
        self.required.iter().any(|l| pr.has_label(l))
    }

    /// Excluded labels carried by `pr`, in sorted order
    pub fn excluded_present<'a>(&'a self, pr: &PullRequest) -> Vec<&'a str> {
        self.excluded
            .iter()
            .filter(|l| pr.has_label(l))
            .map(String::as_str)
            .collect()
    }
}

/// When a push should trigger an update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Condition {
    /// Event that triggers evaluation
    #[serde(rename = "event")]
    pub event_type: EventKind,
    /// Branch names or `*` patterns (empty = no branch triggers)
    #[serde(rename = "branches")]
    pub branch_filter: BTreeSet<String>,
    /// Label requirements
    #[serde(rename = "labels")]
    pub label_filter: LabelFilter,
    /// Only update PRs whose base is the pushed branch
    pub require_base_match: bool,
}

impl Default for Condition {
    fn default() -> Self {
        Self {
            event_type: EventKind::Push,
            branch_filter: BTreeSet::new(),
            label_filter: LabelFilter::default(),
            require_base_match: true,
        }
    }
}

impl Condition {
    /// Condition for pushes to a single branch
    pub fn push_to(branch: impl Into<String>) -> Self {
        Self {
            branch_filter: BTreeSet::from([branch.into()]),
            ..Self::default()
        }
    }

    /// Add a required label
    #[must_use]
    pub fn require_label(mut self, label: impl Into<String>) -> Self {
        self.label_filter.required.insert(label.into());
        self
    }

    /// Add an excluded label
    #[must_use]
    pub fn exclude_label(mut self, label: impl Into<String>) -> Self {
        self.label_filter.excluded.insert(label.into());
        self
    }

    /// Whether `branch` passes the branch filter
    pub fn matches_branch(&self, branch: &str) -> bool {
        self.branch_filter
            .iter()
            .any(|pattern| branch_pattern_matches(pattern, branch))
    }
}

/// Exact match, or `*` wildcard match (a `*` spans any characters)
fn branch_pattern_matches(pattern: &str, branch: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == branch;
    }

    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$")).is_ok_and(|re| re.is_match(branch))
}

/// What to do once the retry budget is spent and the merge still conflicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictAction {
    /// Fail the whole run
    #[default]
    Fail,
    /// Record the PR as conflicted and move on
    Skip,
}

impl std::fmt::Display for ConflictAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fail => write!(f, "fail"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Retry parameters for a conflict-prone merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    /// Total merge attempts (0 behaves like 1)
    pub max_attempts: u32,
    /// Delay between attempts, in seconds
    pub sleep_seconds: u64,
    /// Behavior once attempts are exhausted
    pub on_conflict: ConflictAction,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            sleep_seconds: 300,
            on_conflict: ConflictAction::Fail,
        }
    }
}

impl RetryPolicy {
    /// Number of attempts that will actually be made
    pub fn attempt_budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay between attempts
    pub const fn delay(&self) -> Duration {
        Duration::from_secs(self.sleep_seconds)
    }
}
