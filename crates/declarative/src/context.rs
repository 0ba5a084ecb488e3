//! Apply context and the callbacks the executor reports through
//!
//! Callers plug in their own terminal UI; the crate itself prints nothing.

use crate::types::ApplyResult;
use anyhow::Result;

/// Receives progress while a batch is applied
pub trait ProgressCallback: Send {
    /// `count` resources are about to be applied
    fn on_batch_start(&mut self, count: usize);

    fn on_resource_start(&mut self, id: &str, description: &str);

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    fn on_batch_complete(&mut self);
}

/// Decides whether a batch with pending changes goes ahead
pub trait ConfirmCallback: Send {
    /// `Ok(true)` to proceed
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reports nothing
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _id: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Always proceeds
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Never proceeds
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Flags handed to [`crate::Resource::apply`]
#[derive(Debug, Clone, Default)]
pub struct ApplyContext {
    /// Resources must not touch the target
    pub dry_run: bool,
    pub verbose: bool,
}

impl ApplyContext {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}
