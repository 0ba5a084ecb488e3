//! Execution engine - computes diffs, then applies resources one at a time

use crate::context::{ApplyContext, ConfirmCallback, ProgressCallback};
use crate::diff::{ResourceDiff, compute_diffs};
use crate::planner::ExecutionPlan;
use crate::resource::Resource;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary};
use anyhow::Result;

/// Execute a plan against `target` with the given options and callbacks
///
/// Diffs are computed up front (concurrently, read only). Resources that
/// differ are then applied sequentially, so `target` has a single
/// mutator. An error from one resource is recorded as
/// [`ApplyResult::Failed`] and does not stop the rest of the batch.
///
/// Persisting `target` is left to the caller, once, after this returns.
///
/// # Type Parameters
/// * `T` - The shared state resources read and mutate
/// * `P` - Progress callback type
/// * `C` - Confirm callback type
///
/// # Returns
/// Summary of execution results
pub fn execute<T, P, C>(
    plan: ExecutionPlan<T>,
    target: &mut T,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    T: Sync + ?Sized,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    let diffs = compute_diffs(&plan.resources, target, opts.jobs)?;
    execute_diffs(plan, &diffs, target, opts, progress, confirm)
}

/// Like [`execute`], for a caller that already computed `diffs` for
/// `plan` against `target` (for example to display them first)
///
/// Only resources with an entry in `diffs` are applied.
pub fn execute_diffs<T, P, C>(
    plan: ExecutionPlan<T>,
    diffs: &[ResourceDiff],
    target: &mut T,
    opts: ExecuteOptions,
    progress: &mut P,
    confirm: &mut C,
) -> Result<ExecuteSummary>
where
    T: ?Sized,
    P: ProgressCallback,
    C: ConfirmCallback,
{
    if diffs.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    // Confirm before proceeding (unless dry_run)
    if !opts.dry_run && !confirm.confirm("Apply changes?")? {
        return Ok(ExecuteSummary {
            skipped: diffs.len(),
            ..Default::default()
        });
    }

    if opts.dry_run {
        return Ok(ExecuteSummary::default());
    }

    let pending: Vec<&dyn Resource<T>> = plan
        .resources
        .iter()
        .map(|r| r.as_ref())
        .filter(|r| is_pending(*r, diffs))
        .collect();

    let mut summary = ExecuteSummary::default();

    progress.on_batch_start(pending.len());
    for resource in pending {
        let id = resource.id();
        progress.on_resource_start(&id, &resource.description());
        let result = apply_resource(resource, target, opts.verbose);
        log::debug!("{id}: {result}");
        progress.on_resource_complete(&id, &result);
        summary.add_result(&result);
    }
    progress.on_batch_complete();

    Ok(summary)
}

fn is_pending<T: ?Sized>(resource: &dyn Resource<T>, diffs: &[ResourceDiff]) -> bool {
    let id = resource.id();
    let resource_type = resource.resource_type();
    diffs
        .iter()
        .any(|d| d.resource_id == id && d.resource_type == resource_type)
}

/// Apply a single resource
fn apply_resource<T: ?Sized>(resource: &dyn Resource<T>, target: &mut T, verbose: bool) -> ApplyResult {
    let mut ctx = ApplyContext::new(false, verbose);

    match resource.apply(target, &mut ctx) {
        Ok(result) => result,
        Err(e) => ApplyResult::Failed {
            error: format!("{e:#}"),
        },
    }
}

/// Simple execution without callbacks
///
/// For basic use cases where you don't need progress or confirmation.
pub fn execute_simple<T: Sync + ?Sized>(
    plan: ExecutionPlan<T>,
    target: &mut T,
    opts: ExecuteOptions,
) -> Result<ExecuteSummary> {
    use crate::context::{AutoConfirm, NoProgress};

    execute(plan, target, opts, &mut NoProgress, &mut AutoConfirm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AutoConfirm, AutoDecline, NoProgress};
    use crate::types::ResourceState;
    use std::collections::BTreeMap;

    type Settings = BTreeMap<String, String>;

    #[derive(Debug)]
    struct Setting {
        name: &'static str,
        value: &'static str,
    }

    impl Resource<Settings> for Setting {
        fn id(&self) -> String {
            self.name.to_string()
        }

        fn description(&self) -> String {
            format!("Set {} = {}", self.name, self.value)
        }

        fn resource_type(&self) -> &'static str {
            "test"
        }

        fn current_state(&self, target: &Settings) -> Result<ResourceState> {
            Ok(match target.get(self.name) {
                Some(v) => ResourceState::Present {
                    details: Some(v.clone()),
                },
                None => ResourceState::Absent,
            })
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Present {
                details: Some(self.value.to_string()),
            }
        }

        fn apply(&self, target: &mut Settings, ctx: &mut ApplyContext) -> Result<ApplyResult> {
            if ctx.dry_run {
                return Ok(ApplyResult::Skipped {
                    reason: "Dry run".into(),
                });
            }
            if self.value == "fail" {
                anyhow::bail!("refusing to set {}", self.name);
            }
            let previous = target.insert(self.name.to_string(), self.value.to_string());
            Ok(match previous {
                None => ApplyResult::Created,
                Some(_) => ApplyResult::Modified,
            })
        }
    }

    fn plan(settings: &[(&'static str, &'static str)]) -> ExecutionPlan<Settings> {
        let mut plan = ExecutionPlan::new();
        for &(name, value) in settings {
            plan.add_resource(Box::new(Setting { name, value }));
        }
        plan
    }

    #[test]
    fn test_execute_diffs_applies_only_listed_resources() {
        let mut target = Settings::new();
        let full = plan(&[("a", "1"), ("b", "2")]);
        let diffs = compute_diffs(&full.resources[..1], &target, 1).unwrap();

        let result = execute_diffs(
            full,
            &diffs,
            &mut target,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(result.created, 1);
        assert_eq!(target.get("a").map(String::as_str), Some("1"));
        assert!(!target.contains_key("b"));
    }

    #[test]
    fn test_execute_empty_plan() {
        let mut target = Settings::new();
        let result = execute_simple(plan(&[]), &mut target, ExecuteOptions::default()).unwrap();
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_execute_no_changes() {
        let mut target = Settings::from([("a".to_string(), "1".to_string())]);
        let result = execute_simple(plan(&[("a", "1")]), &mut target, ExecuteOptions::default()).unwrap();

        // No diff means no execution
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_execute_with_changes() {
        let mut target = Settings::from([("b".to_string(), "old".to_string())]);
        let result = execute(
            plan(&[("a", "1"), ("b", "2"), ("c", "fail")]),
            &mut target,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoConfirm,
        )
        .unwrap();

        assert_eq!(result.created, 1);
        assert_eq!(result.modified, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(target.get("a").map(String::as_str), Some("1"));
        assert_eq!(target.get("b").map(String::as_str), Some("2"));
        assert!(!target.contains_key("c"));
    }

    #[test]
    fn test_execute_declined() {
        let mut target = Settings::new();
        let result = execute(
            plan(&[("a", "1")]),
            &mut target,
            ExecuteOptions::default(),
            &mut NoProgress,
            &mut AutoDecline,
        )
        .unwrap();

        assert_eq!(result.skipped, 1);
        assert!(target.is_empty());
    }

    #[test]
    fn test_execute_dry_run_leaves_target() {
        let mut target = Settings::new();
        let opts = ExecuteOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = execute(plan(&[("a", "1")]), &mut target, opts, &mut NoProgress, &mut AutoDecline).unwrap();

        assert_eq!(result.total(), 0);
        assert!(target.is_empty());
    }
}
