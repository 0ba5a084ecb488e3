//! In-memory collection of keys, sorted by name

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::key::Key;
use crate::name;

/// A set of keys loaded from (and flushed back to) a store.
///
/// There is at most one mutator at a time: callers hold `&mut KeySet`
/// while applying changes and flush once when the batch is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Key>", into = "Vec<Key>")]
pub struct KeySet {
    keys: BTreeMap<String, Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a key by exact name
    pub fn lookup(&self, name: &str) -> Option<&Key> {
        self.keys.get(name)
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Key> {
        self.keys.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Insert a key, returning the key it replaced
    pub fn insert(&mut self, key: Key) -> Option<Key> {
        self.keys.insert(key.name().to_string(), key)
    }

    pub fn remove(&mut self, name: &str) -> Option<Key> {
        self.keys.remove(name)
    }

    /// Look up a key, creating an empty one if absent
    pub fn get_or_create(&mut self, name: &str) -> &mut Key {
        self.keys
            .entry(name.to_string())
            .or_insert_with(|| Key::new(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    /// Keys at or below `root`
    pub fn below<'a>(&'a self, root: &'a str) -> impl Iterator<Item = &'a Key> + 'a {
        self.keys
            .values()
            .filter(move |k| name::is_below(k.name(), root))
    }

    /// Remove every key at or below `root`
    pub fn remove_below(&mut self, root: &str) {
        self.keys.retain(|n, _| !name::is_below(n, root));
    }

    /// Add all keys of `other`, replacing same-named keys
    pub fn merge(&mut self, other: KeySet) {
        self.keys.extend(other.keys);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<Vec<Key>> for KeySet {
    fn from(keys: Vec<Key>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<KeySet> for Vec<Key> {
    fn from(set: KeySet) -> Self {
        set.keys.into_values().collect()
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self {
            keys: iter
                .into_iter()
                .map(|k| (k.name().to_string(), k))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> KeySet {
        [
            Key::new("user/app/port").with_value("80"),
            Key::new("user/app/host").with_value("localhost"),
            Key::new("user/application").with_value("x"),
            Key::new("system/app/port").with_value("8080"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_lookup_and_contains() {
        let ks = sample();
        assert_eq!(ks.lookup("user/app/port").and_then(Key::value), Some("80"));
        assert!(ks.contains("system/app/port"));
        assert!(ks.lookup("user/app/missing").is_none());
    }

    #[test]
    fn test_below_is_segment_aware() {
        let ks = sample();
        let names: Vec<_> = ks.below("user/app").map(Key::name).collect();
        assert_eq!(names, vec!["user/app/host", "user/app/port"]);
    }

    #[test]
    fn test_get_or_create() {
        let mut ks = KeySet::new();
        ks.get_or_create("user/a").set_value("1");
        ks.get_or_create("user/a").set_meta("m", "v");
        assert_eq!(ks.len(), 1);
        let key = ks.lookup("user/a").unwrap();
        assert_eq!(key.value(), Some("1"));
        assert_eq!(key.meta("m"), Some("v"));
    }

    #[test]
    fn test_remove_below() {
        let mut ks = sample();
        ks.remove_below("user/app");
        assert_eq!(ks.len(), 2);
        assert!(ks.contains("user/application"));
    }

    #[test]
    fn test_merge_replaces() {
        let mut ks = sample();
        let other: KeySet = [Key::new("user/app/port").with_value("81")]
            .into_iter()
            .collect();
        ks.merge(other);
        assert_eq!(ks.lookup("user/app/port").and_then(Key::value), Some("81"));
        assert_eq!(ks.len(), 4);
    }
}
