//! Search-path resolution
//!
//! Two-phase pattern:
//! 1. Parse - templates become `PathRule`s (config load time)
//! 2. Resolve - rules plus an explicit environment become paths (pure)

mod resolve;
mod rule;

pub use resolve::{PathResolver, resolve_paths};
pub use rule::{INTERPRETER_VERSION_PLACEHOLDER, PathRule, Segment, parse_template};
