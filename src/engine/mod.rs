//! Execution engine for kdbkey
//!
//! The engine orchestrates one batch:
//! 1. Loading - every root is read from the store once into one [`KeySet`]
//! 2. Diffing - current vs desired state of every key
//! 3. Executing - keys are applied one at a time, then each root is flushed once

pub mod differ;
pub mod executor;

use anyhow::{Context, Result};
use declarative::ExecutionPlan;
use keyset::{KeySet, Store, name};
use std::collections::BTreeSet;

use crate::config::KeyDecl;
use crate::resource::KeyResource;

pub use executor::{ExecuteOptions, execute};

/// Roots to load and flush for a set of managed keys
///
/// One root per top-level path, plus the matching spec root when the
/// key manages checks.
pub fn roots(decls: &[KeyDecl]) -> Vec<String> {
    let mut roots = BTreeSet::new();
    for decl in decls {
        let root = name::top_root(&decl.name);
        if decl.check.is_some() {
            roots.insert(name::spec_key_name(&root));
        }
        roots.insert(root);
    }
    roots.into_iter().collect()
}

/// Build the plan converging every declared key, in manifest order
pub fn build_plan(decls: &[KeyDecl]) -> ExecutionPlan<KeySet> {
    let mut plan = ExecutionPlan::new();
    for decl in decls {
        plan.add_resource(Box::new(KeyResource::from(decl.clone())));
    }
    plan
}

/// The in-memory key set of one batch and the store it came from
pub struct Session {
    store: Box<dyn Store>,
    roots: Vec<String>,
    keys: KeySet,
}

impl Session {
    /// Load every root once
    pub fn open(store: Box<dyn Store>, roots: Vec<String>) -> Result<Self> {
        let mut keys = KeySet::new();
        for root in &roots {
            let loaded = store
                .load(root)
                .with_context(|| format!("Failed to load {root} from {} store", store.name()))?;
            log::debug!("Loaded {} keys below {root}", loaded.len());
            keys.merge(loaded);
        }
        Ok(Self { store, roots, keys })
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    pub fn keys_mut(&mut self) -> &mut KeySet {
        &mut self.keys
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Persist every root once
    ///
    /// Stops at the first failing root; roots already written stay written.
    pub fn flush(&self) -> Result<()> {
        for root in &self.roots {
            self.store
                .flush(root, &self.keys)
                .with_context(|| format!("Failed to flush {root} to {} store", self.store.name()))?;
            log::debug!("Flushed {root}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keymeta::CheckSpec;
    use keyset::Key;
    use keyset::backend::memory::MemoryStore;
    use std::sync::Arc;

    fn decl(name: &str) -> KeyDecl {
        KeyDecl::new(name)
    }

    #[test]
    fn test_roots_are_deduplicated() {
        let mut with_check = decl("user/app/mode");
        with_check.check = Some(CheckSpec::Shorthand("long".into()));
        let decls = vec![decl("user/app/port"), decl("user/app/host"), decl("system/hosts/ipv4"), with_check];

        assert_eq!(
            roots(&decls),
            vec!["spec/#0#check/app", "system/hosts", "user/app"]
        );
    }

    #[test]
    fn test_build_plan_keeps_order() {
        let plan = build_plan(&[decl("user/b"), decl("user/a")]);
        let ids: Vec<String> = plan.resources.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["user/b", "user/a"]);
    }

    #[derive(Clone)]
    struct Shared(Arc<MemoryStore>);

    impl Store for Shared {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn load(&self, root: &str) -> keyset::Result<KeySet> {
            self.0.load(root)
        }

        fn flush(&self, root: &str, keys: &KeySet) -> keyset::Result<()> {
            self.0.flush(root, keys)
        }
    }

    #[test]
    fn test_session_loads_and_flushes_roots() {
        let store = Arc::new(MemoryStore::with_keys([
            Key::new("user/app/port").with_value("1"),
            Key::new("user/other/x").with_value("2"),
        ]));

        let mut session = Session::open(Box::new(Shared(Arc::clone(&store))), vec!["user/app".into()]).unwrap();
        assert_eq!(session.keys().len(), 1);
        assert_eq!(session.store_name(), "memory");

        session.keys_mut().insert(Key::new("user/app/host").with_value("h"));
        session.flush().unwrap();

        let stored = store.snapshot();
        assert!(stored.contains("user/app/host"));
        assert!(stored.contains("user/other/x"));
    }
}
