//! Paths command - print the resolved search-path entries

use crate::cli::context::CommandContext;
use anstream::println;
use branchbot::error::{Error, Result};
use branchbot::paths::resolve_paths;
use branchbot::types::InterpreterVersion;
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::debug;

/// How resolved paths are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PathFormat {
    /// One path per line
    Lines,
    /// A single string joined with the platform path separator
    SearchPath,
    /// JSON array of strings
    Json,
}

/// Options for the paths command
#[derive(Debug, Clone)]
pub struct PathsOptions {
    /// Overrides the working directory used for relative rules
    pub base_dir: Option<PathBuf>,
    /// Overrides the configured interpreter version
    pub interpreter_version: Option<InterpreterVersion>,
    /// Output format
    pub format: PathFormat,
}

/// Render paths in the requested format
pub fn render_paths(paths: &[PathBuf], format: PathFormat) -> Result<String> {
    match format {
        PathFormat::Lines => Ok(paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        PathFormat::SearchPath => {
            let joined = std::env::join_paths(paths)
                .map_err(|e| Error::Config(format!("cannot build search path: {e}")))?;
            Ok(joined.to_string_lossy().into_owned())
        }
        PathFormat::Json => Ok(serde_json::to_string_pretty(paths)?),
    }
}

/// Run the paths command
pub fn run_paths(ctx: &CommandContext, options: &PathsOptions) -> Result<()> {
    let config = &ctx.loaded.config;
    let base_dir = options
        .base_dir
        .as_deref()
        .map_or_else(|| ctx.working_dir.clone(), |dir| ctx.resolve(dir));
    let interpreter_version = options
        .interpreter_version
        .or(config.paths.interpreter_version);

    debug!(
        base_dir = %base_dir.display(),
        rules = config.paths.rules.len(),
        "resolving search paths"
    );

    let paths = resolve_paths(
        &base_dir,
        &config.paths.rules,
        &ctx.env,
        interpreter_version,
    );

    if paths.is_empty() && options.format != PathFormat::Json {
        return Ok(());
    }

    println!("{}", render_paths(&paths, options.format)?);
    Ok(())
}
