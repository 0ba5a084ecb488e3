//! Declarative commands
//!
//! - `status` - Show which managed keys are in sync
//! - `diff` - Preview what apply would change
//! - `apply` - Make the store match the manifest

use anyhow::Result;
use colored::Colorize;
use declarative::{ExecutionPlan, ResourceDiff, compute_diffs};
use keyset::KeySet;

use crate::Context;
use crate::config::Manifest;
use crate::engine::{self, ExecuteOptions, Session, differ};
use crate::ui;

/// Manifest, plan filtered by `target`, and the loaded session
fn prepare(ctx: &Context, target: Option<&str>) -> Result<(ExecutionPlan<KeySet>, Session)> {
    let (manifest, path) = Manifest::resolve(ctx.manifest.as_deref())?;
    log::info!("Manifest {} declares {} keys", path.display(), manifest.keys.len());

    let plan = engine::build_plan(&manifest.keys).filter_by_target(target);
    if let Some(t) = target
        && plan.is_empty()
    {
        ui::warn(&format!("No managed key matches '{t}'"));
    }

    let session = super::open_session(ctx, &manifest, engine::roots(&manifest.keys))?;
    Ok((plan, session))
}

// ============================================================================
// Status Command
// ============================================================================

pub fn status(ctx: &Context, target: Option<&str>, jobs: usize) -> Result<()> {
    ui::header("Key Status");

    let (plan, session) = prepare(ctx, target)?;
    let diffs = compute_diffs(&plan.resources, session.keys(), jobs)?;

    ui::kv("Store", session.store_name());
    ui::kv("Keys", &plan.total_resources().to_string());
    ui::section("Keys");

    for resource in &plan.resources {
        let id = resource.id();
        match diffs.iter().find(|d| d.resource_id == id) {
            None => println!("  {} {}", "✓".green(), id),
            Some(diff) => println!("  {} {} {}", status_icon(diff), id.bold(), status_text(diff).dimmed()),
        }
    }

    println!();
    if diffs.is_empty() {
        ui::success("All keys in sync");
    } else {
        ui::warn(&format!("{} out of sync - run 'kdbkey apply'", ui::count(diffs.len(), "key")));
    }

    Ok(())
}

fn status_icon(diff: &ResourceDiff) -> colored::ColoredString {
    if diff.is_addition() {
        "✗".red()
    } else if diff.is_removal() {
        "-".red()
    } else {
        "⚠".yellow()
    }
}

fn status_text(diff: &ResourceDiff) -> &'static str {
    if diff.is_addition() {
        "(missing)"
    } else if diff.is_removal() {
        "(present, should be absent)"
    } else {
        "(differs)"
    }
}

// ============================================================================
// Diff Command
// ============================================================================

pub fn diff(ctx: &Context, target: Option<&str>, jobs: usize) -> Result<()> {
    let (plan, session) = prepare(ctx, target)?;
    let diffs = compute_diffs(&plan.resources, session.keys(), jobs)?;
    differ::display_diff(&diffs);
    Ok(())
}

// ============================================================================
// Apply Command
// ============================================================================

pub fn apply(ctx: &Context, target: Option<&str>, dry_run: bool, yes: bool, jobs: usize) -> Result<()> {
    ui::header("Applying Keys");

    if dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let (plan, mut session) = prepare(ctx, target)?;
    let opts = ExecuteOptions {
        dry_run,
        jobs,
        yes,
        verbose: ctx.verbose > 0,
        quiet: ctx.quiet,
    };

    let summary = engine::execute(plan, &mut session, opts)?;
    if !summary.is_success() {
        anyhow::bail!("{} could not be applied", ui::count(summary.failed, "key"));
    }

    Ok(())
}
