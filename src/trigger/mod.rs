//! Trigger engine for label-driven branch updates
//!
//! Three-phase pattern:
//! 1. Gather - event and PR listing (caller, from files or flags)
//! 2. Plan - create `UpdatePlan` (pure, testable)
//! 3. Execute - perform merges with retries (effectful)

mod condition;
mod execute;
mod plan;

pub use condition::{Condition, ConflictAction, LabelFilter, RetryPolicy};
pub use execute::{
    ConflictedPr, NoopProgress, ProgressCallback, RetriedMerge, UpdateExecutionResult, UpdatedPr,
    execute_update, merge_with_retry,
};
pub use plan::{Decision, UpdatePlan, UpdateStep, create_update_plan, evaluate};
