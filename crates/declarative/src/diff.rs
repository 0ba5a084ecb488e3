//! Diff computation for resources

use crate::resource::{BoxedResource, Resource};
use crate::types::ResourceState;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A diff between current and desired state of a resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDiff {
    /// Unique identifier of the resource
    pub resource_id: String,
    /// Type of the resource
    pub resource_type: String,
    /// Human-readable description
    pub description: String,
    /// Current state
    pub current: ResourceState,
    /// Desired state
    pub desired: ResourceState,
}

impl ResourceDiff {
    /// Create a diff from a resource, returning None if no changes needed
    pub fn from_resource<T: ?Sized>(resource: &dyn Resource<T>, target: &T) -> Result<Option<Self>> {
        let current = resource.current_state(target)?;
        let desired = resource.desired_state();

        if current == desired {
            return Ok(None);
        }

        Ok(Some(Self {
            resource_id: resource.id(),
            resource_type: resource.resource_type().to_string(),
            description: resource.description(),
            current,
            desired,
        }))
    }

    /// Check if this diff represents an addition
    pub fn is_addition(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Absent, ResourceState::Present { .. })
        )
    }

    /// Check if this diff represents a removal
    pub fn is_removal(&self) -> bool {
        matches!(
            (&self.current, &self.desired),
            (ResourceState::Present { .. }, ResourceState::Absent)
        )
    }

    /// Anything that is neither an addition nor a removal
    pub fn is_modification(&self) -> bool {
        !self.is_addition() && !self.is_removal()
    }
}

/// Compute diffs for a list of resources
///
/// Current states are read concurrently on a pool of `jobs` threads.
/// Returns only resources that differ, in input order. A resource whose
/// state cannot be read fails the whole computation.
pub fn compute_diffs<T>(resources: &[BoxedResource<T>], target: &T, jobs: usize) -> Result<Vec<ResourceDiff>>
where
    T: Sync + ?Sized,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()
        .context("Failed to create diff thread pool")?;

    let diffs: Vec<Option<ResourceDiff>> = pool.install(|| {
        resources
            .par_iter()
            .map(|r| {
                ResourceDiff::from_resource(r.as_ref(), target)
                    .with_context(|| format!("Failed to read state of {}", r.id()))
            })
            .collect::<Result<_>>()
    })?;

    Ok(diffs.into_iter().flatten().collect())
}

/// Diff summary statistics
#[derive(Debug, Clone, Default)]
pub struct DiffSummary {
    /// Number of resources to add
    pub additions: usize,
    /// Number of resources to remove
    pub removals: usize,
    /// Number of resources to modify
    pub modifications: usize,
}

impl DiffSummary {
    /// Create a summary from a list of diffs
    pub fn from_diffs(diffs: &[ResourceDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            if diff.is_addition() {
                summary.additions += 1;
            } else if diff.is_removal() {
                summary.removals += 1;
            } else {
                summary.modifications += 1;
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.removals + self.modifications
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}

/// Group diffs by resource type
pub fn group_by_type(diffs: &[ResourceDiff]) -> HashMap<String, Vec<&ResourceDiff>> {
    let mut groups: HashMap<String, Vec<&ResourceDiff>> = HashMap::new();
    for diff in diffs {
        groups
            .entry(diff.resource_type.clone())
            .or_default()
            .push(diff);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(current: ResourceState, desired: ResourceState) -> ResourceDiff {
        ResourceDiff {
            resource_id: "id".into(),
            resource_type: "key".into(),
            description: "desc".into(),
            current,
            desired,
        }
    }

    fn present(details: &str) -> ResourceState {
        ResourceState::Present {
            details: Some(details.into()),
        }
    }

    #[test]
    fn test_diff_classification() {
        assert!(diff(ResourceState::Absent, present("a")).is_addition());
        assert!(diff(present("a"), ResourceState::Absent).is_removal());
        assert!(diff(present("a"), present("b")).is_modification());
    }

    #[test]
    fn test_summary_from_diffs() {
        let diffs = vec![
            diff(ResourceState::Absent, present("a")),
            diff(present("a"), ResourceState::Absent),
            diff(present("a"), present("b")),
            diff(present("c"), present("d")),
        ];
        let summary = DiffSummary::from_diffs(&diffs);
        assert_eq!(summary.additions, 1);
        assert_eq!(summary.removals, 1);
        assert_eq!(summary.modifications, 2);
        assert!(summary.has_changes());
    }

    #[test]
    fn test_group_by_type() {
        let mut other = diff(ResourceState::Absent, present("a"));
        other.resource_type = "other".into();
        let diffs = vec![diff(ResourceState::Absent, present("a")), other];

        let groups = group_by_type(&diffs);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["key"].len(), 1);
    }
}
