//! Merge backends
//!
//! Provides the seam through which branch updates are actually performed.

mod git;

pub use git::GitBackend;

use crate::error::Result;
use crate::types::MergeOutcome;
use async_trait::async_trait;

/// Backend trait for merging one branch into another
///
/// The trigger executor only talks to this trait, so the retry logic can
/// be exercised against a scripted backend in tests.
#[async_trait]
pub trait MergeBackend: Send + Sync {
    /// Merge `base` into `head`.
    ///
    /// A conflicting merge must be rolled back and reported as
    /// `MergeOutcome::Conflict`, not as an error. Errors are reserved for
    /// failures that retrying cannot fix.
    async fn merge(&self, head: &str, base: &str) -> Result<MergeOutcome>;
}
