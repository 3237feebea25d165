//! Shared test fixtures

#![allow(dead_code)]

mod mock_backend;

pub use mock_backend::{MergeCall, MockMergeBackend, conflict};

use async_trait::async_trait;
use branchbot::trigger::ProgressCallback;
use branchbot::types::{PrState, PullRequest};
use std::sync::Mutex;

/// Open PR from `head` into `base` with the given labels
pub fn make_pr(number: u64, head: &str, base: &str, labels: &[&str]) -> PullRequest {
    PullRequest {
        number,
        title: format!("PR for {head}"),
        head_ref: head.to_string(),
        base_ref: base.to_string(),
        labels: labels.iter().map(|l| (*l).to_string()).collect(),
        state: PrState::Open,
    }
}

/// Progress callback that records every message
#[derive(Default)]
pub struct RecordingProgress {
    messages: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
