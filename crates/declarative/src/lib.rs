//! # Declarative
//!
//! Converge resources living inside one shared target.
//!
//! A resource (a [`Resource<T>`]) knows how to read its state out of a
//! target `T`, what state it wants, and how to write it. An
//! [`ExecutionPlan<T>`] lists resources in apply order and [`execute`]
//! runs it:
//!
//! 1. current states are read concurrently ([`compute_diffs`])
//! 2. the caller confirms ([`ConfirmCallback`])
//! 3. differing resources are applied one by one against `&mut T`
//!    ([`ProgressCallback`] is told about each)
//!
//! Persisting the target is the caller's job, once, after `execute`
//! returns.
//!
//! ```ignore
//! let mut plan = ExecutionPlan::new();
//! plan.add_resource(Box::new(Setting { name: "a".into(), value: "1".into() }));
//!
//! let mut settings = BTreeMap::new();
//! let summary = execute_simple(plan, &mut settings, ExecuteOptions::default())?;
//! ```

pub mod context;
pub mod diff;
pub mod executor;
pub mod planner;
pub mod resource;
pub mod types;

pub use context::{ApplyContext, AutoConfirm, AutoDecline, ConfirmCallback, NoProgress, ProgressCallback};
pub use diff::{DiffSummary, ResourceDiff, compute_diffs, group_by_type};
pub use executor::{execute, execute_diffs, execute_simple};
pub use planner::ExecutionPlan;
pub use resource::{BoxedResource, Resource};
pub use types::{ApplyResult, ExecuteOptions, ExecuteSummary, ResourceState};
