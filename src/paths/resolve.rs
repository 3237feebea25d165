//! Path resolution - pure functions turning rules into search-path entries
//!
//! No process state is read here. The environment and the interpreter
//! version are passed in, so resolution is deterministic and easy to test.

use crate::env::Environment;
use crate::paths::rule::{PathRule, Segment};
use crate::types::InterpreterVersion;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves path rules against a working directory and an environment
#[derive(Debug, Clone)]
pub struct PathResolver<'a> {
    working_dir: &'a Path,
    env: &'a Environment,
    interpreter_version: Option<InterpreterVersion>,
}

impl<'a> PathResolver<'a> {
    /// Create a resolver rooted at `working_dir`
    pub const fn new(working_dir: &'a Path, env: &'a Environment) -> Self {
        Self {
            working_dir,
            env,
            interpreter_version: None,
        }
    }

    /// Set the interpreter version used for `{python_version}`
    #[must_use]
    pub const fn with_interpreter_version(mut self, version: Option<InterpreterVersion>) -> Self {
        self.interpreter_version = version;
        self
    }

    /// Resolve a single rule.
    ///
    /// Segments are concatenated; an absolute result is used as-is,
    /// otherwise it is joined onto the rule's base directory.
    pub fn resolve_rule(&self, rule: &PathRule) -> PathBuf {
        let text = self.expand(&rule.segments);

        if Path::new(&text).is_absolute() {
            return PathBuf::from(text);
        }

        let base = rule
            .base_dir
            .as_deref()
            .map_or_else(|| self.working_dir.to_path_buf(), |b| self.working_dir.join(b));

        if text.is_empty() {
            base
        } else {
            base.join(text)
        }
    }

    /// Resolve all rules, one entry per rule, in rule order
    pub fn resolve(&self, rules: &[PathRule]) -> Vec<PathBuf> {
        rules.iter().map(|rule| self.resolve_rule(rule)).collect()
    }

    fn expand(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        for segment in segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Env(name) => {
                    if let Some(value) = self.env.get(name) {
                        out.push_str(value);
                    } else {
                        debug!(variable = %name, "environment variable unset, using empty string");
                    }
                }
                Segment::InterpreterVersion => match self.interpreter_version {
                    Some(version) => out.push_str(&version.to_string()),
                    None => debug!("interpreter version unknown, using empty string"),
                },
            }
        }
        out
    }
}

/// Resolve `rules` into an ordered list of search-path entries
pub fn resolve_paths(
    working_dir: &Path,
    rules: &[PathRule],
    env: &Environment,
    interpreter_version: Option<InterpreterVersion>,
) -> Vec<PathBuf> {
    PathResolver::new(working_dir, env)
        .with_interpreter_version(interpreter_version)
        .resolve(rules)
}
