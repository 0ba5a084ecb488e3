//! Execution planning - ordered resources with target filtering

use crate::resource::{BoxedResource, Resource};

/// An execution plan: resources in the order they are applied
pub struct ExecutionPlan<T: ?Sized> {
    /// Resources to converge, applied one at a time
    pub resources: Vec<BoxedResource<T>>,
}

impl<T: ?Sized> ExecutionPlan<T> {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
        }
    }

    /// Add a resource to the end of the plan
    pub fn add_resource(&mut self, resource: BoxedResource<T>) {
        self.resources.push(resource);
    }

    /// Filter plan to only include resources matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&dyn Resource<T>) -> bool,
    {
        Self {
            resources: self
                .resources
                .into_iter()
                .filter(|r| predicate(r.as_ref()))
                .collect(),
        }
    }

    /// Filter plan to only include resources matching a target
    ///
    /// A target is either a resource type (e.g. "key") or a path prefix
    /// matched on whole segments ("user/app" matches "user/app/port" but
    /// not "user/application").
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => self.filter(|r| matches_target(r, t)),
        }
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.resources.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<T: ?Sized> Default for ExecutionPlan<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a resource matches a target
fn matches_target<T: ?Sized>(resource: &dyn Resource<T>, target: &str) -> bool {
    if resource.resource_type() == target {
        return true;
    }

    let target = target.trim_end_matches('/');
    let id = resource.id();
    id == target
        || id
            .strip_prefix(target)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ApplyContext;
    use crate::types::{ApplyResult, ResourceState};
    use anyhow::Result;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Resource<()> for Named {
        fn id(&self) -> String {
            self.0.to_string()
        }

        fn description(&self) -> String {
            self.0.to_string()
        }

        fn resource_type(&self) -> &'static str {
            "key"
        }

        fn current_state(&self, _target: &()) -> Result<ResourceState> {
            Ok(ResourceState::Absent)
        }

        fn desired_state(&self) -> ResourceState {
            ResourceState::Absent
        }

        fn apply(&self, _target: &mut (), _ctx: &mut ApplyContext) -> Result<ApplyResult> {
            Ok(ApplyResult::NoChange)
        }
    }

    fn plan() -> ExecutionPlan<()> {
        let mut plan = ExecutionPlan::new();
        for name in ["user/app/port", "user/app/host", "user/application", "system/app"] {
            plan.add_resource(Box::new(Named(name)));
        }
        plan
    }

    fn ids(plan: &ExecutionPlan<()>) -> Vec<String> {
        plan.resources.iter().map(|r| r.id()).collect()
    }

    #[test]
    fn test_filter_by_prefix() {
        let filtered = plan().filter_by_target(Some("user/app"));
        assert_eq!(ids(&filtered), vec!["user/app/port", "user/app/host"]);
    }

    #[test]
    fn test_filter_by_exact_id() {
        let filtered = plan().filter_by_target(Some("user/application"));
        assert_eq!(ids(&filtered), vec!["user/application"]);
    }

    #[test]
    fn test_filter_by_type() {
        assert_eq!(plan().filter_by_target(Some("key")).total_resources(), 4);
    }

    #[test]
    fn test_no_target_keeps_everything() {
        let plan = plan().filter_by_target(None);
        assert_eq!(plan.total_resources(), 4);
        assert!(!plan.is_empty());
    }
}
