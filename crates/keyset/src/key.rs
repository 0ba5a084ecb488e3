//! A single key: name, optional value and ordered metadata

use serde::{Deserialize, Serialize};

/// One metadata entry attached to a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub name: String,
    pub value: String,
}

/// A key in a hierarchical key database.
///
/// Metadata names are unique and keep insertion order; overwriting an
/// existing entry keeps its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    meta: Vec<MetaEntry>,
}

impl Key {
    /// Create a key without value or metadata
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            meta: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_meta(mut self, name: &str, value: &str) -> Self {
        self.set_meta(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// Look up a metadata value by name
    pub fn meta(&self, name: &str) -> Option<&str> {
        self.meta
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value.as_str())
    }

    pub fn has_meta(&self, name: &str) -> bool {
        self.meta.iter().any(|m| m.name == name)
    }

    /// Set a metadata entry, overwriting in place or appending
    pub fn set_meta(&mut self, name: &str, value: &str) {
        match self.meta.iter_mut().find(|m| m.name == name) {
            Some(entry) => value.clone_into(&mut entry.value),
            None => self.meta.push(MetaEntry {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Remove a metadata entry, returning its previous value
    pub fn remove_meta(&mut self, name: &str) -> Option<String> {
        let idx = self.meta.iter().position(|m| m.name == name)?;
        Some(self.meta.remove(idx).value)
    }

    /// Iterate metadata as `(name, value)` in insertion order
    pub fn meta_iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.meta
            .iter()
            .map(|m| (m.name.as_str(), m.value.as_str()))
    }

    /// Owned copy of all metadata names, for loops that mutate the key
    pub fn meta_names(&self) -> Vec<String> {
        self.meta.iter().map(|m| m.name.clone()).collect()
    }

    pub fn meta_len(&self) -> usize {
        self.meta.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_meta_overwrites_in_place() {
        let mut key = Key::new("user/a")
            .with_meta("first", "1")
            .with_meta("second", "2");
        key.set_meta("first", "one");

        let entries: Vec<_> = key.meta_iter().collect();
        assert_eq!(entries, vec![("first", "one"), ("second", "2")]);
    }

    #[test]
    fn test_remove_meta() {
        let mut key = Key::new("user/a").with_meta("x", "1");
        assert_eq!(key.remove_meta("x"), Some("1".to_string()));
        assert_eq!(key.remove_meta("x"), None);
        assert_eq!(key.meta_len(), 0);
    }

    #[test]
    fn test_value_lifecycle() {
        let mut key = Key::new("user/a");
        assert_eq!(key.value(), None);
        key.set_value("v");
        assert_eq!(key.value(), Some("v"));
        key.clear_value();
        assert_eq!(key.value(), None);
    }

    #[test]
    fn test_meta_lookup() {
        let key = Key::new("user/a").with_value("x").with_meta("type", "long");
        assert_eq!(key.meta("type"), Some("long"));
        assert!(key.has_meta("type"));
        assert!(!key.has_meta("missing"));
        assert_eq!(key.meta_names(), vec!["type".to_string()]);
    }
}
