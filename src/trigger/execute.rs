//! Update execution - effectful operations
//!
//! Takes an `UpdatePlan` (created by the pure planning functions) and drives
//! each merge through a `MergeBackend`, retrying conflicts per `RetryPolicy`.

use crate::backend::MergeBackend;
use crate::error::{Error, Result};
use crate::trigger::condition::{ConflictAction, RetryPolicy};
use crate::trigger::plan::{UpdatePlan, UpdateStep};
use crate::types::MergeOutcome;
use async_trait::async_trait;
use tracing::{info, warn};

/// Progress callback for status updates during execution
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Free-form status message
    async fn on_message(&self, message: &str);

    /// A merge attempt is about to start
    async fn on_attempt(&self, head: &str, attempt: u32, budget: u32) {
        if attempt > 1 {
            self.on_message(&format!("Retrying {head} (attempt {attempt}/{budget})"))
                .await;
        }
    }
}

/// Progress callback that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}
}

/// Final outcome of a merge after retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetriedMerge {
    /// Outcome of the last attempt
    pub outcome: MergeOutcome,
    /// Number of attempts made
    pub attempts: u32,
}

/// Merge `base` into `head`, retrying while the merge conflicts.
///
/// At most `policy.attempt_budget()` attempts are made, with
/// `policy.delay()` between consecutive attempts. A conflict on the last
/// attempt is returned as the outcome; the caller applies `on_conflict`.
pub async fn merge_with_retry(
    backend: &dyn MergeBackend,
    head: &str,
    base: &str,
    policy: &RetryPolicy,
    progress: &dyn ProgressCallback,
) -> Result<RetriedMerge> {
    let budget = policy.attempt_budget();
    let mut attempt = 0;

    loop {
        attempt += 1;
        progress.on_attempt(head, attempt, budget).await;
        info!(head, base, attempt, budget, "attempting merge");

        let outcome = backend.merge(head, base).await?;

        if !outcome.is_conflict() || attempt >= budget {
            return Ok(RetriedMerge {
                outcome,
                attempts: attempt,
            });
        }

        warn!(
            head,
            base,
            attempt,
            delay_secs = policy.sleep_seconds,
            "merge conflicted, waiting before retry"
        );
        progress
            .on_message(&format!(
                "Conflict merging {base} into {head}, retrying in {}s",
                policy.sleep_seconds
            ))
            .await;
        tokio::time::sleep(policy.delay()).await;
    }
}

/// A PR whose head was updated (or already current)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatedPr {
    /// PR number
    pub pr_number: u64,
    /// Head branch
    pub head_ref: String,
    /// Final merge outcome (never a conflict)
    pub outcome: MergeOutcome,
    /// Attempts it took
    pub attempts: u32,
}

/// A PR left conflicting under `on_conflict = skip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictedPr {
    /// PR number
    pub pr_number: u64,
    /// Head branch
    pub head_ref: String,
    /// Attempts made before giving up
    pub attempts: u32,
}

/// Result of update execution
#[derive(Debug, Clone, Default)]
pub struct UpdateExecutionResult {
    /// PRs that were merged or found up to date
    pub updated: Vec<UpdatedPr>,
    /// PRs skipped by the plan
    pub skipped: Vec<u64>,
    /// PRs that still conflicted after all attempts
    pub conflicted: Vec<ConflictedPr>,
}

impl UpdateExecutionResult {
    /// Check if every planned merge went through
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.conflicted.is_empty()
    }

    /// Number of PRs that received a new merge commit
    #[must_use]
    pub fn merged_count(&self) -> usize {
        self.updated
            .iter()
            .filter(|u| matches!(u.outcome, MergeOutcome::Merged { .. }))
            .count()
    }
}

/// Execute the update plan (EFFECTFUL)
///
/// Steps run sequentially in plan order. Under `on_conflict = fail` the
/// first PR that exhausts its attempts ends execution with
/// `Error::MergeConflict`.
pub async fn execute_update(
    plan: &UpdatePlan,
    policy: &RetryPolicy,
    backend: &dyn MergeBackend,
    progress: &dyn ProgressCallback,
) -> Result<UpdateExecutionResult> {
    let mut result = UpdateExecutionResult::default();

    for step in &plan.steps {
        match step {
            UpdateStep::Merge {
                pr_number,
                pr_title,
                head_ref,
                base_ref,
            } => {
                progress
                    .on_message(&format!("🔀 Updating PR #{pr_number}: {pr_title}"))
                    .await;

                let retried = merge_with_retry(backend, head_ref, base_ref, policy, progress).await?;

                match retried.outcome {
                    MergeOutcome::Conflict { ref message } => match policy.on_conflict {
                        ConflictAction::Fail => {
                            warn!(pr = pr_number, head = %head_ref, %message, "giving up after conflicts");
                            return Err(Error::MergeConflict {
                                branch: head_ref.clone(),
                                attempts: retried.attempts,
                            });
                        }
                        ConflictAction::Skip => {
                            progress
                                .on_message(&format!(
                                    "⚠️  PR #{pr_number} still conflicts after {} attempt(s), skipping",
                                    retried.attempts
                                ))
                                .await;
                            result.conflicted.push(ConflictedPr {
                                pr_number: *pr_number,
                                head_ref: head_ref.clone(),
                                attempts: retried.attempts,
                            });
                        }
                    },
                    MergeOutcome::Merged { ref sha } => {
                        progress.on_message(&format!("✅ Merged: {sha}")).await;
                        result.updated.push(UpdatedPr {
                            pr_number: *pr_number,
                            head_ref: head_ref.clone(),
                            outcome: retried.outcome.clone(),
                            attempts: retried.attempts,
                        });
                    }
                    MergeOutcome::UpToDate => {
                        progress
                            .on_message(&format!("✅ {head_ref} already up to date"))
                            .await;
                        result.updated.push(UpdatedPr {
                            pr_number: *pr_number,
                            head_ref: head_ref.clone(),
                            outcome: MergeOutcome::UpToDate,
                            attempts: retried.attempts,
                        });
                    }
                }
            }
            UpdateStep::Skip {
                pr_number,
                head_ref,
                reasons,
            } => {
                progress
                    .on_message(&format!(
                        "⏭️  Skipping PR #{pr_number} ({head_ref}): {}",
                        reasons.join(", ")
                    ))
                    .await;
                result.skipped.push(*pr_number);
            }
        }
    }

    Ok(result)
}
