//! Trigger command - update labelled pull requests after a push

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, Stylize, arrow};
use anstream::println;
use branchbot::error::{Error, Result};
use branchbot::event::{load_pull_requests, load_push_event};
use branchbot::trigger::{
    UpdateExecutionResult, UpdatePlan, UpdateStep, create_update_plan, execute_update,
};
use branchbot::types::{Event, EventKind, MergeOutcome};
use std::path::PathBuf;
use tracing::{info, warn};

/// Options for the trigger command
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct TriggerOptions {
    /// Event name (e.g. "push")
    pub event_name: String,
    /// Pushed branch, given directly
    pub branch: Option<String>,
    /// Push payload to read the branch from
    pub event_path: Option<PathBuf>,
    /// Pull request listing
    pub pulls: PathBuf,
    /// Checkout to merge in
    pub repo: Option<PathBuf>,
    /// Remote override
    pub remote: Option<String>,
    /// Ignore any remote and merge local branches
    pub local: bool,
    /// Skip pushing
    pub no_push: bool,
    /// Dry run - show what would be updated without merging
    pub dry_run: bool,
}

/// Run the trigger command
pub async fn run_trigger(ctx: &CommandContext, options: TriggerOptions) -> Result<()> {
    // =========================================================================
    // Phase 1: GATHER
    // =========================================================================

    let kind = EventKind::from(options.event_name.as_str());
    let event = match (&options.branch, &options.event_path) {
        (Some(branch), _) => Event {
            kind,
            branch: Some(branch.clone()),
        },
        (None, Some(path)) => load_push_event(kind, &ctx.resolve(path))?,
        (None, None) => {
            return Err(Error::Event(
                "no pushed branch: pass --branch or --event-path".to_string(),
            ));
        }
    };

    let pull_requests = load_pull_requests(&ctx.resolve(&options.pulls))?;
    info!(
        event = %event.kind,
        branch = event.branch.as_deref().unwrap_or("-"),
        pulls = pull_requests.len(),
        "evaluating trigger"
    );

    // =========================================================================
    // Phase 2: PLAN
    // =========================================================================

    let config = &ctx.loaded.config;
    let plan = create_update_plan(&config.trigger, &event, &pull_requests);

    if !plan.is_triggered() {
        println!("{}", "Not triggered:".muted());
        for reason in &plan.event_reasons {
            println!("  - {}", reason.muted());
        }
        return Ok(());
    }

    if options.dry_run {
        report_dry_run(&plan);
        return Ok(());
    }

    if plan.is_empty() {
        println!("{}", "No pull requests to update.".muted());
        print_skip_summary(&plan);
        return Ok(());
    }

    // =========================================================================
    // Phase 3: EXECUTE
    // =========================================================================

    let mut git = config.git.clone();
    if options.local {
        git.remote = None;
    } else if let Some(remote) = options.remote {
        git.remote = Some(remote);
    }
    if options.no_push {
        git.push = false;
    }
    let repo_dir = options
        .repo
        .as_deref()
        .map_or_else(|| ctx.working_dir.clone(), |dir| ctx.resolve(dir));
    let backend = git.backend(repo_dir);

    println!(
        "{} {}",
        "Updating".emphasis(),
        format!("{} PR(s)...", plan.merge_count()).accent()
    );

    let result = execute_update(&plan, &config.retry, &backend, &CliProgress).await?;
    print_summary(&result);

    if !result.is_success() {
        let count = result.conflicted.len();
        warn!(conflicted = count, "update finished with conflicted pull requests");
        return Err(Error::ConflictsRemaining { count });
    }

    Ok(())
}

/// Report what would be updated (dry run)
fn report_dry_run(plan: &UpdatePlan) {
    println!("{}:", "Update plan".emphasis());
    println!();

    if plan.steps.is_empty() {
        println!("  {}", "No pull requests to process".muted());
        println!();
        return;
    }

    for step in &plan.steps {
        match step {
            UpdateStep::Merge { .. } => {
                println!("  {} {}", arrow(), step.to_string().success());
            }
            UpdateStep::Skip {
                pr_number,
                head_ref,
                reasons,
            } => {
                println!("  {} PR #{pr_number} ({head_ref})", "✗ Would skip".warn());
                for reason in reasons {
                    println!("    - {}", reason.muted());
                }
            }
        }
    }

    println!();
    if plan.is_empty() {
        println!("{}", "No pull requests would be updated.".muted());
    } else {
        println!("{}", "Run without --dry-run to execute.".muted());
    }
}

/// Print skip reasons when nothing is merged
fn print_skip_summary(plan: &UpdatePlan) {
    for step in &plan.steps {
        if let UpdateStep::Skip {
            pr_number,
            head_ref,
            reasons,
        } = step
        {
            println!("  PR #{} ({}):", pr_number, head_ref.accent());
            for reason in reasons {
                println!("    - {}", reason.muted());
            }
        }
    }
}

/// Print execution summary
fn print_summary(result: &UpdateExecutionResult) {
    println!();
    if result.is_success() {
        println!(
            "{} {} merged, {} already up to date, {} skipped",
            format!("{CHECK} Update complete:").success(),
            result.merged_count().accent(),
            (result.updated.len() - result.merged_count()).accent(),
            result.skipped.len().accent()
        );
    } else {
        println!("{} Update partially complete", "⚠️".warn());
    }

    for updated in &result.updated {
        if let MergeOutcome::Merged { sha } = &updated.outcome {
            println!(
                "   PR #{} {} {}",
                updated.pr_number,
                updated.head_ref.accent(),
                sha.muted()
            );
        }
    }

    for conflicted in &result.conflicted {
        println!(
            "   {} PR #{} {} ({} attempts)",
            "Conflicted:".warn(),
            conflicted.pr_number,
            conflicted.head_ref.warn(),
            conflicted.attempts
        );
    }
}
