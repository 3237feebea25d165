//! Config command - print the effective configuration

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::{eprintln, print};
use branchbot::config::render_config;
use branchbot::error::Result;

/// Run the config command
pub fn run_config(ctx: &CommandContext) -> Result<()> {
    match &ctx.loaded.source {
        Some(path) => eprintln!("{}", format!("# loaded from {}", path.display()).muted()),
        None => eprintln!("{}", "# no config file found, showing defaults".muted()),
    }
    print!("{}", render_config(&ctx.loaded.config)?);
    Ok(())
}
