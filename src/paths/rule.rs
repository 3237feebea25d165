//! Path rules and their template syntax

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Placeholder for the interpreter version inside a template
pub const INTERPRETER_VERSION_PLACEHOLDER: &str = "{python_version}";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\$|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\{python_version\}")
        .unwrap_or_else(|e| unreachable!("placeholder regex is valid: {e}"))
});

/// One piece of a path rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, copied as-is
    Literal(String),
    /// Environment variable, empty when unset
    Env(String),
    /// Interpreter `major.minor` version, empty when unknown
    InterpreterVersion,
}

/// A declarative instruction for constructing one search-path entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPathRule", into = "RawPathRule")]
pub struct PathRule {
    /// Directory the rule is relative to (None = resolver's working directory)
    pub base_dir: Option<String>,
    /// Ordered segments, concatenated without separators
    pub segments: Vec<Segment>,
}

impl PathRule {
    /// Rule with segments relative to the working directory
    pub const fn new(segments: Vec<Segment>) -> Self {
        Self {
            base_dir: None,
            segments,
        }
    }

    /// Parse a rule from a template such as `${VIRTUAL_ENV}/lib/python{python_version}`
    pub fn parse(template: &str) -> Result<Self> {
        Ok(Self::new(parse_template(template)?))
    }

    /// Set the base directory
    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// Render the segments back into template syntax
    pub fn template(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(&text.replace('$', "$$")),
                Segment::Env(name) => {
                    out.push_str("${");
                    out.push_str(name);
                    out.push('}');
                }
                Segment::InterpreterVersion => out.push_str(INTERPRETER_VERSION_PLACEHOLDER),
            }
        }
        out
    }
}

/// Split a template into segments.
///
/// `${NAME}` is an environment variable, `{python_version}` the interpreter
/// version and `$$` a literal `$`. Adjacent literal text is merged.
pub fn parse_template(template: &str) -> Result<Vec<Segment>> {
    if template.is_empty() {
        return Err(Error::Config("path rule template is empty".to_string()));
    }

    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last = 0;

    for caps in PLACEHOLDER_RE.captures_iter(template) {
        let Some(whole) = caps.get(0) else { continue };
        literal.push_str(&template[last..whole.start()]);
        last = whole.end();

        if whole.as_str() == "$$" {
            literal.push('$');
            continue;
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        match caps.get(1) {
            Some(name) => segments.push(Segment::Env(name.as_str().to_string())),
            None => segments.push(Segment::InterpreterVersion),
        }
    }

    literal.push_str(&template[last..]);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    Ok(segments)
}

/// On-disk form of a path rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPathRule {
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_dir: Option<String>,
}

impl TryFrom<RawPathRule> for PathRule {
    type Error = Error;

    fn try_from(raw: RawPathRule) -> Result<Self> {
        Ok(Self {
            base_dir: raw.base_dir,
            segments: parse_template(&raw.path)?,
        })
    }
}

impl From<PathRule> for RawPathRule {
    fn from(rule: PathRule) -> Self {
        Self {
            path: rule.template(),
            base_dir: rule.base_dir,
        }
    }
}
