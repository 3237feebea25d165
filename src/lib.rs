//! branchbot - search-path resolution and label-driven branch updates
//!
//! Two independent pieces:
//! - [`paths`] turns declarative path rules plus an explicit environment into
//!   an ordered search-path list.
//! - [`trigger`] decides whether a push should update labelled pull requests
//!   and drives the merges through a [`backend::MergeBackend`] with retries.

pub mod backend;
pub mod config;
pub mod env;
pub mod error;
pub mod event;
pub mod paths;
pub mod trigger;
pub mod types;

pub use error::{Error, Result};
