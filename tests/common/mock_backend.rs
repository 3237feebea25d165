//! Mock merge backend for testing

use async_trait::async_trait;
use branchbot::backend::MergeBackend;
use branchbot::error::{Error, Result};
use branchbot::types::MergeOutcome;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Call record for `merge`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCall {
    pub head: String,
    pub base: String,
}

/// Scripted merge backend
///
/// Features:
/// - Per-branch queue of outcomes, consumed one per call
/// - Branches that conflict forever
/// - Call tracking for verification
/// - Error injection for failure path testing
///
/// Once a branch's queue is empty, merges succeed with sha `merged_<head>`.
#[derive(Default)]
pub struct MockMergeBackend {
    scripted: Mutex<HashMap<String, VecDeque<MergeOutcome>>>,
    always_conflict: Mutex<Vec<String>>,
    calls: Mutex<Vec<MergeCall>>,
    error_on_merge: Mutex<Option<String>>,
}

impl MockMergeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for `head`, returned in order
    pub fn script(&self, head: &str, outcomes: Vec<MergeOutcome>) {
        self.scripted
            .lock()
            .unwrap()
            .entry(head.to_string())
            .or_default()
            .extend(outcomes);
    }

    /// Queue `count` conflicts for `head`
    pub fn conflict_times(&self, head: &str, count: usize) {
        self.script(head, vec![conflict(); count]);
    }

    /// Make every merge into `head` conflict
    pub fn always_conflict(&self, head: &str) {
        self.always_conflict.lock().unwrap().push(head.to_string());
    }

    /// Make `merge` return a git error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// All recorded calls
    pub fn calls(&self) -> Vec<MergeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls for `head`
    pub fn calls_for(&self, head: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.head == head)
            .count()
    }
}

/// A conflict outcome
pub fn conflict() -> MergeOutcome {
    MergeOutcome::Conflict {
        message: "CONFLICT (content): Merge conflict in shared.txt".to_string(),
    }
}

#[async_trait]
impl MergeBackend for MockMergeBackend {
    async fn merge(&self, head: &str, base: &str) -> Result<MergeOutcome> {
        self.calls.lock().unwrap().push(MergeCall {
            head: head.to_string(),
            base: base.to_string(),
        });

        if let Some(msg) = self.error_on_merge.lock().unwrap().clone() {
            return Err(Error::Git(msg));
        }

        if self.always_conflict.lock().unwrap().iter().any(|h| h == head) {
            return Ok(conflict());
        }

        let next = self
            .scripted
            .lock()
            .unwrap()
            .get_mut(head)
            .and_then(VecDeque::pop_front);

        Ok(next.unwrap_or_else(|| MergeOutcome::Merged {
            sha: format!("merged_{head}"),
        }))
    }
}
