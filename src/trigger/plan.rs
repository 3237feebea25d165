//! Trigger evaluation - pure functions for deciding and planning updates
//!
//! No I/O happens here. The event, condition and pull requests are passed
//! in and a plan comes out, which keeps the decision logic unit-testable.

use crate::trigger::condition::Condition;
use crate::types::{Event, PrState, PullRequest};

/// Whether a single pull request should be updated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Merge the base branch into the PR head
    Merge,
    /// Leave the PR alone
    Skip {
        /// Human-readable reasons
        reasons: Vec<String>,
    },
}

impl Decision {
    /// Whether the decision is to merge
    pub const fn is_merge(&self) -> bool {
        matches!(self, Self::Merge)
    }
}

/// Reasons the event itself does not trigger anything (empty = it triggers)
fn event_block_reasons(condition: &Condition, event: &Event) -> Vec<String> {
    let mut reasons = Vec::new();

    if event.kind != condition.event_type {
        reasons.push(format!(
            "event '{}' does not match '{}'",
            event.kind, condition.event_type
        ));
    }

    match event.branch.as_deref() {
        None => reasons.push("event does not refer to a branch".to_string()),
        Some(_) if condition.branch_filter.is_empty() => {
            reasons.push("no branches are configured for updates".to_string());
        }
        Some(branch) if !condition.matches_branch(branch) => {
            reasons.push(format!("branch '{branch}' is not configured for updates"));
        }
        Some(_) => {}
    }

    reasons
}

/// Decide whether `pr` should be updated in response to `event` (PURE)
pub fn evaluate(condition: &Condition, event: &Event, pr: &PullRequest) -> Decision {
    let mut reasons = event_block_reasons(condition, event);

    if pr.state != PrState::Open {
        reasons.push(format!("PR is {}", pr.state));
    }

    if condition.require_base_match {
        if let Some(branch) = event.branch.as_deref() {
            if pr.base_ref != branch {
                reasons.push(format!(
                    "base '{}' is not the pushed branch '{branch}'",
                    pr.base_ref
                ));
            }
        }
    }

    let filter = &condition.label_filter;

    if filter.required.is_empty() {
        reasons.push("no required labels are configured".to_string());
    } else if !filter.has_required(pr) {
        let wanted: Vec<&str> = filter.required.iter().map(String::as_str).collect();
        reasons.push(format!("missing required label ({})", wanted.join(", ")));
    }

    for label in filter.excluded_present(pr) {
        reasons.push(format!("has excluded label '{label}'"));
    }

    if reasons.is_empty() {
        Decision::Merge
    } else {
        Decision::Skip { reasons }
    }
}

/// A single step in the update plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateStep {
    /// Merge `base_ref` into `head_ref`
    Merge {
        /// PR number
        pr_number: u64,
        /// PR title (for display)
        pr_title: String,
        /// Branch that receives the merge
        head_ref: String,
        /// Branch being merged in
        base_ref: String,
    },
    /// Leave this PR alone
    Skip {
        /// PR number
        pr_number: u64,
        /// PR head branch
        head_ref: String,
        /// Reasons why this PR is not updated
        reasons: Vec<String>,
    },
}

impl UpdateStep {
    /// PR number for this step
    pub const fn pr_number(&self) -> u64 {
        match self {
            Self::Merge { pr_number, .. } | Self::Skip { pr_number, .. } => *pr_number,
        }
    }
}

impl std::fmt::Display for UpdateStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merge {
                pr_number,
                pr_title,
                head_ref,
                base_ref,
            } => write!(f, "merge {base_ref} into {head_ref} (PR #{pr_number}: {pr_title})"),
            Self::Skip {
                pr_number,
                head_ref,
                reasons,
            } => {
                write!(f, "skip PR #{pr_number} ({head_ref})")?;
                if !reasons.is_empty() {
                    write!(f, ": {}", reasons.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

/// Update plan - the functional core output
///
/// Created by `create_update_plan()` (pure) and executed by
/// `execute_update()` (effectful).
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    /// Branch the triggering push went to
    pub pushed_branch: Option<String>,
    /// Reasons the event did not trigger at all (empty when it did)
    pub event_reasons: Vec<String>,
    /// Steps in PR input order
    pub steps: Vec<UpdateStep>,
}

impl UpdatePlan {
    /// Whether the event matched the condition
    pub fn is_triggered(&self) -> bool {
        self.event_reasons.is_empty()
    }

    /// Check if the plan has no merge steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| matches!(s, UpdateStep::Merge { .. }))
    }

    /// Count merge steps
    #[must_use]
    pub fn merge_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, UpdateStep::Merge { .. }))
            .count()
    }
}

/// Create an update plan (PURE - no I/O)
///
/// When the event does not trigger, the plan carries the reasons and no
/// steps. Otherwise there is one step per pull request, in input order.
#[must_use]
pub fn create_update_plan(
    condition: &Condition,
    event: &Event,
    pull_requests: &[PullRequest],
) -> UpdatePlan {
    let event_reasons = event_block_reasons(condition, event);
    if !event_reasons.is_empty() {
        return UpdatePlan {
            pushed_branch: event.branch.clone(),
            event_reasons,
            steps: Vec::new(),
        };
    }

    let steps = pull_requests
        .iter()
        .map(|pr| match evaluate(condition, event, pr) {
            Decision::Merge => UpdateStep::Merge {
                pr_number: pr.number,
                pr_title: pr.title.clone(),
                head_ref: pr.head_ref.clone(),
                base_ref: pr.base_ref.clone(),
            },
            Decision::Skip { reasons } => UpdateStep::Skip {
                pr_number: pr.number,
                head_ref: pr.head_ref.clone(),
                reasons,
            },
        })
        .collect();

    UpdatePlan {
        pushed_branch: event.branch.clone(),
        event_reasons,
        steps,
    }
}
