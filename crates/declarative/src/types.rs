//! State, result and option types shared by resources and the executor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Observed or wanted state of a resource
///
/// Two states compare equal exactly when the resource needs no change, so
/// `details` must only describe properties the resource manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceState {
    /// Exists; `details` renders the managed properties
    Present { details: Option<String> },
    /// Does not exist
    Absent,
    /// Exists with a single property that differs
    Modified { from: String, to: String },
    /// Could not be read
    Unknown,
}

impl ResourceState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }

    /// Rendered properties of a present resource
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Present { details } => details.as_deref(),
            _ => None,
        }
    }
}

/// Outcome of applying one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already converged
    NoChange,
    Created,
    /// Some properties were rewritten
    Modified,
    Removed,
    /// The resource reported an error; the batch goes on
    Failed { error: String },
    /// Nothing was attempted
    Skipped { reason: String },
}

impl ApplyResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChange => write!(f, "unchanged"),
            Self::Created => write!(f, "created"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Failed { error } => write!(f, "failed: {error}"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}

/// Per-outcome counters for one batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Resources whose target state was written
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Every resource that reported an outcome
    pub fn total(&self) -> usize {
        self.total_changes() + self.skipped + self.failed + self.no_change
    }

    /// Count one outcome
    pub fn add_result(&mut self, result: &ApplyResult) {
        let counter = match result {
            ApplyResult::NoChange => &mut self.no_change,
            ApplyResult::Created => &mut self.created,
            ApplyResult::Modified => &mut self.modified,
            ApplyResult::Removed => &mut self.removed,
            ApplyResult::Failed { .. } => &mut self.failed,
            ApplyResult::Skipped { .. } => &mut self.skipped,
        };
        *counter += 1;
    }
}

/// Options for one execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Report what would change without applying
    pub dry_run: bool,
    /// Threads used while reading current state
    pub jobs: usize,
    /// Passed through to [`crate::ApplyContext`]
    pub verbose: bool,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 4,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = ExecuteSummary::default();
        for result in [
            ApplyResult::Created,
            ApplyResult::Modified,
            ApplyResult::NoChange,
            ApplyResult::Failed {
                error: "boom".into(),
            },
        ] {
            summary.add_result(&result);
        }

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.total_changes(), 2);
        assert!(!summary.is_success());
    }

    #[test]
    fn test_result_display() {
        assert_eq!(ApplyResult::NoChange.to_string(), "unchanged");
        assert_eq!(
            ApplyResult::Failed {
                error: "store locked".into()
            }
            .to_string(),
            "failed: store locked"
        );
        assert!(!ApplyResult::Failed { error: String::new() }.is_success());
    }

    #[test]
    fn test_state_details() {
        let state = ResourceState::Present {
            details: Some("value: 1".into()),
        };
        assert_eq!(state.details(), Some("value: 1"));
        assert!(state.is_present());
        assert_eq!(ResourceState::Absent.details(), None);
    }
}
