//! branchbot CLI

mod cli;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use cli::style::Stylize;
use cli::{CommandContext, PathFormat, PathsOptions, TriggerOptions};
use std::path::PathBuf;
use std::process::ExitCode;

use branchbot::types::InterpreterVersion;

/// Search-path resolution and label-driven branch updates for CI
#[derive(Debug, Parser)]
#[command(name = "branchbot", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Config file (defaults to ./branchbot.toml, then the user config dir)
    #[arg(long, global = true, env = "BRANCHBOT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the resolved search-path entries
    Paths {
        /// Directory relative rules resolve against (defaults to the current directory)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Interpreter version for {python_version} placeholders (e.g. 3.8)
        #[arg(long)]
        interpreter_version: Option<InterpreterVersion>,

        /// Output format
        #[arg(long, value_enum, default_value_t = PathFormat::Lines)]
        format: PathFormat,
    },

    /// Update labelled pull requests after a push
    Trigger {
        /// Event name
        #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "push")]
        event_name: String,

        /// Branch that was pushed (takes precedence over --event-path)
        #[arg(long)]
        branch: Option<String>,

        /// Push event payload (JSON)
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        event_path: Option<PathBuf>,

        /// Pull request listing (JSON array)
        #[arg(long)]
        pulls: PathBuf,

        /// Git checkout to update (defaults to the current directory)
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Remote to fetch from and push to (overrides config)
        #[arg(long, conflicts_with = "local")]
        remote: Option<String>,

        /// Merge local branches only, without fetching or pushing
        #[arg(long)]
        local: bool,

        /// Do not push updated branches
        #[arg(long)]
        no_push: bool,

        /// Show what would be updated without merging
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the effective configuration
    Config,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let ctx = CommandContext::new(cwd, cli.config.as_deref())?;

    match cli.command {
        Commands::Paths {
            base_dir,
            interpreter_version,
            format,
        } => cli::run_paths(
            &ctx,
            &PathsOptions {
                base_dir,
                interpreter_version,
                format,
            },
        )?,
        Commands::Trigger {
            event_name,
            branch,
            event_path,
            pulls,
            repo,
            remote,
            local,
            no_push,
            dry_run,
        } => {
            cli::run_trigger(
                &ctx,
                TriggerOptions {
                    event_name,
                    branch,
                    event_path,
                    pulls,
                    repo,
                    remote,
                    local,
                    no_push,
                    dry_run,
                },
            )
            .await?;
        }
        Commands::Config => cli::run_config(&ctx)?,
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose, cli.log_json);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            anstream::eprintln!("{} {e:#}", "error:".error());
            ExitCode::FAILURE
        }
    }
}
