//! Resource trait for declarative state management
//!
//! A Resource represents something that can be in a certain state inside
//! a shared target `T` (for example an in-memory key set), and can be
//! changed to reach a desired state.

use crate::context::ApplyContext;
use crate::types::{ApplyResult, ResourceState};
use anyhow::Result;
use std::fmt;

/// Something inside a shared target `T` that can be read and converged
///
/// Reading takes `&T` so diffs can be computed concurrently; applying
/// takes `&mut T`, so there is only ever one mutator. See [`crate::execute`] for the order
/// in which these are called.
pub trait Resource<T: ?Sized>: Send + Sync + fmt::Debug {
    /// Stable identifier, unique within the resource type (e.g. a key name)
    fn id(&self) -> String;

    /// One-line summary for prompts and progress
    fn description(&self) -> String;

    /// Category used for grouping and `filter_by_target`
    fn resource_type(&self) -> &'static str;

    /// State of the resource as found in `target`
    fn current_state(&self, target: &T) -> Result<ResourceState>;

    /// State the resource should reach, derived from its declaration
    fn desired_state(&self) -> ResourceState;

    /// Whether current and desired state differ
    fn needs_apply(&self, target: &T) -> Result<bool> {
        let current = self.current_state(target)?;
        let desired = self.desired_state();
        Ok(current != desired)
    }

    /// Converge `target`
    ///
    /// Must return `Skipped` without touching `target` when
    /// `ctx.dry_run` is set, and `NoChange` when already converged.
    fn apply(&self, target: &mut T, ctx: &mut ApplyContext) -> Result<ApplyResult>;
}

/// Type-erased resource as stored in a plan
pub type BoxedResource<T> = Box<dyn Resource<T>>;
