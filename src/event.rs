//! Event payload and pull request listing parsing
//!
//! Both inputs use the shapes GitHub produces: the push webhook payload
//! (as found at `GITHUB_EVENT_PATH`) and the REST pulls listing.

use crate::error::{Error, Result};
use crate::types::{Event, EventKind, PrState, PullRequest};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

#[derive(Debug, Deserialize)]
struct RawBranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Named { name: String },
    Plain(String),
}

impl RawLabel {
    fn into_name(self) -> String {
        match self {
            Self::Named { name } | Self::Plain(name) => name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPullRequest {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default = "default_state")]
    state: String,
    #[serde(default)]
    merged_at: Option<String>,
    head: RawBranchRef,
    base: RawBranchRef,
    #[serde(default)]
    labels: Vec<RawLabel>,
}

fn default_state() -> String {
    "open".to_string()
}

impl TryFrom<RawPullRequest> for PullRequest {
    type Error = Error;

    fn try_from(raw: RawPullRequest) -> Result<Self> {
        let state = match (raw.state.as_str(), raw.merged_at.is_some()) {
            (_, true) => PrState::Merged,
            ("open", false) => PrState::Open,
            ("closed", false) => PrState::Closed,
            (other, false) => {
                return Err(Error::Event(format!(
                    "PR #{} has unknown state '{other}'",
                    raw.number
                )));
            }
        };

        Ok(Self {
            number: raw.number,
            title: raw.title,
            head_ref: raw.head.name,
            base_ref: raw.base.name,
            labels: raw.labels.into_iter().map(RawLabel::into_name).collect(),
            state,
        })
    }
}

fn with_path(err: Error, path: &Path) -> Error {
    match err {
        Error::Event(msg) => Error::Event(format!("{}: {msg}", path.display())),
        other => other,
    }
}

/// Branch name of a `refs/heads/...` ref, `None` for tags and other refs
pub fn branch_from_ref(git_ref: &str) -> Option<&str> {
    git_ref
        .strip_prefix("refs/heads/")
        .filter(|name| !name.is_empty())
}

/// Build an event from a push payload
pub fn parse_push_event(kind: EventKind, payload: &str) -> Result<Event> {
    let payload: PushPayload = serde_json::from_str(payload)
        .map_err(|e| Error::Event(format!("invalid push payload: {e}")))?;

    Ok(Event {
        kind,
        branch: branch_from_ref(&payload.git_ref).map(str::to_string),
    })
}

/// Read and parse a push payload file
pub fn load_push_event(kind: EventKind, path: &Path) -> Result<Event> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Event(format!("failed to read {}: {e}", path.display())))?;
    parse_push_event(kind, &content).map_err(|e| with_path(e, path))
}

/// Parse a pull request listing (JSON array)
pub fn parse_pull_requests(listing: &str) -> Result<Vec<PullRequest>> {
    let raw: Vec<RawPullRequest> = serde_json::from_str(listing)
        .map_err(|e| Error::Event(format!("invalid pull request listing: {e}")))?;
    raw.into_iter().map(PullRequest::try_from).collect()
}

/// Read and parse a pull request listing file
pub fn load_pull_requests(path: &Path) -> Result<Vec<PullRequest>> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Event(format!("failed to read {}: {e}", path.display())))?;
    parse_pull_requests(&content).map_err(|e| with_path(e, path))
}
