//! In-process store, used as the injected store in tests.

use std::sync::Mutex;

use crate::backend::Store;
use crate::error::Result;
use crate::key::Key;
use crate::set::KeySet;

/// Store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: Mutex<KeySet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `keys`.
    pub fn with_keys(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: Mutex::new(keys.into_iter().collect()),
        }
    }

    /// Copy of everything currently stored.
    pub fn snapshot(&self) -> KeySet {
        match self.keys.lock() {
            Ok(keys) => keys.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, root: &str) -> Result<KeySet> {
        Ok(self.snapshot().below(root).cloned().collect())
    }

    fn flush(&self, root: &str, keys: &KeySet) -> Result<()> {
        let mut stored = match self.keys.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        stored.remove_below(root);
        for key in keys.below(root) {
            stored.insert(key.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_filters_by_root() {
        let store = MemoryStore::with_keys([
            Key::new("user/app/a").with_value("1"),
            Key::new("user/other/b").with_value("2"),
        ]);
        let ks = store.load("user/app").unwrap();
        assert_eq!(ks.len(), 1);
        assert!(ks.contains("user/app/a"));
    }

    #[test]
    fn test_flush_replaces_root_only() {
        let store = MemoryStore::with_keys([
            Key::new("user/app/a").with_value("1"),
            Key::new("user/app/stale").with_value("x"),
            Key::new("user/other/b").with_value("2"),
        ]);

        let mut ks = store.load("user/app").unwrap();
        ks.remove("user/app/stale");
        ks.get_or_create("user/app/new").set_value("3");
        store.flush("user/app", &ks).unwrap();

        let stored = store.snapshot();
        assert!(stored.contains("user/app/a"));
        assert!(stored.contains("user/app/new"));
        assert!(!stored.contains("user/app/stale"));
        assert!(stored.contains("user/other/b"));
    }
}
