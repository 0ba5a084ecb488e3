//! Execution engine - kdbkey executor with UI integration

use anyhow::{Context, Result};
use colored::Colorize;
use declarative::{ConfirmCallback, ExecuteSummary, ExecutionPlan, compute_diffs};
use keyset::KeySet;

use super::Session;
use super::differ::display_diff;
use crate::progress::BarProgress;

/// Options for execution (includes `yes` for confirmation skip)
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Number of threads used to compute diffs
    pub jobs: usize,
    /// Skip confirmation prompts
    pub yes: bool,
    /// Verbose output
    pub verbose: bool,
    /// Hide the progress bar
    pub quiet: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            yes: false,
            verbose: false,
            quiet: false,
        }
    }
}

/// Asks on the terminal unless `--yes` was given
struct PromptConfirm {
    yes: bool,
}

impl ConfirmCallback for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.yes {
            return Ok(true);
        }

        let confirmed = dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()?;

        Ok(confirmed)
    }
}

/// Execute the plan against the session, flushing once at the end
///
/// The store is only written when at least one key changed. If the batch
/// had failures the keys that did apply are still flushed.
pub fn execute(plan: ExecutionPlan<KeySet>, session: &mut Session, opts: ExecuteOptions) -> Result<ExecuteSummary> {
    let diffs = compute_diffs(&plan.resources, session.keys(), opts.jobs)?;
    display_diff(&diffs);

    if diffs.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    let exec_opts = declarative::ExecuteOptions {
        dry_run: opts.dry_run,
        jobs: opts.jobs,
        verbose: opts.verbose,
    };

    let summary = declarative::execute_diffs(
        plan,
        &diffs,
        session.keys_mut(),
        exec_opts,
        &mut BarProgress::new(opts.quiet),
        &mut PromptConfirm { yes: opts.yes },
    )?;

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(summary);
    }

    if summary.skipped == diffs.len() && summary.total_changes() == 0 {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(summary);
    }

    if summary.total_changes() > 0 {
        session
            .flush()
            .with_context(|| format!("Failed to persist {} changes", summary.total_changes()))?;
    }

    print_summary(&summary, session.store_name());

    Ok(summary)
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, store: &str) {
    println!();
    if summary.is_success() {
        println!("  {} Keys applied successfully ({store} store)", "✓".green().bold());
    } else {
        println!("  {} Keys applied with errors ({store} store)", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} keys created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} keys modified", summary.modified);
    }
    if summary.removed > 0 {
        println!("    • {} keys removed", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} keys skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "keys".red());
    }
}
