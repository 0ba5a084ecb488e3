//! TOML file backend.
//!
//! The whole database lives in one file:
//!
//! ```toml
//! [[keys]]
//! name = "user/app/port"
//! value = "8080"
//!
//! [[keys.meta]]
//! name = "type"
//! value = "long"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::backend::Store;
use crate::error::{Error, Result};
use tempfile::NamedTempFile;
use crate::set::KeySet;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    keys: KeySet,
}

/// Store backed by a single TOML file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<KeySet> {
        if !self.path.exists() {
            log::debug!("Store file {} does not exist, starting empty", self.path.display());
            return Ok(KeySet::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let file: StoreFile = toml::from_str(&content).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(file.keys)
    }

    fn write_all(&self, keys: KeySet) -> Result<()> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(&StoreFile { keys })?;
        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl Store for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn load(&self, root: &str) -> Result<KeySet> {
        let all = self.read_all()?;
        let keys: KeySet = all.below(root).cloned().collect();
        log::debug!(
            "Loaded {} keys below {} from {}",
            keys.len(),
            root,
            self.path.display()
        );
        Ok(keys)
    }

    fn flush(&self, root: &str, keys: &KeySet) -> Result<()> {
        let mut all = self.read_all()?;
        all.remove_below(root);
        for key in keys.below(root) {
            all.insert(key.clone());
        }
        self.write_all(all)?;
        log::debug!("Flushed {} to {}", root, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.toml"));
        assert!(store.load("user/app").unwrap().is_empty());
    }

    #[test]
    fn test_flush_then_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("store.toml"));

        let ks: KeySet = [
            Key::new("user/app/port")
                .with_value("8080")
                .with_meta("type", "long")
                .with_meta("comments", "#0")
                .with_meta("comments/#0", "#port"),
            Key::new("user/app/empty"),
        ]
        .into_iter()
        .collect();

        store.flush("user/app", &ks).unwrap();
        let loaded = store.load("user/app").unwrap();

        assert_eq!(loaded, ks);
        let port = loaded.lookup("user/app/port").unwrap();
        let meta: Vec<_> = port.meta_iter().collect();
        assert_eq!(
            meta,
            vec![("type", "long"), ("comments", "#0"), ("comments/#0", "#port")]
        );
        assert_eq!(loaded.lookup("user/app/empty").unwrap().value(), None);
    }

    #[test]
    fn test_concurrent_flushes_leave_only_the_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");

        std::thread::scope(|s| {
            for i in 0..4 {
                let path = path.clone();
                s.spawn(move || {
                    let keys: KeySet = [Key::new(format!("user/app{i}/k")).with_value("v")]
                        .into_iter()
                        .collect();
                    FileStore::new(path).flush(&format!("user/app{i}"), &keys).unwrap();
                });
            }
        });

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("store.toml")]);
        assert!(FileStore::new(&path).load("user").is_ok());
    }

    #[test]
    fn test_flush_keeps_other_roots() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.toml"));

        let other: KeySet = [Key::new("system/x").with_value("1")].into_iter().collect();
        store.flush("system/x", &other).unwrap();

        let app: KeySet = [Key::new("user/app/a").with_value("2")].into_iter().collect();
        store.flush("user/app", &app).unwrap();

        assert!(store.load("system/x").unwrap().contains("system/x"));
        assert!(store.load("user/app").unwrap().contains("user/app/a"));
    }

    #[test]
    fn test_flush_removes_deleted_keys() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.toml"));

        let ks: KeySet = [
            Key::new("user/app/a").with_value("1"),
            Key::new("user/app/b").with_value("2"),
        ]
        .into_iter()
        .collect();
        store.flush("user/app", &ks).unwrap();

        let mut loaded = store.load("user/app").unwrap();
        loaded.remove("user/app/b");
        store.flush("user/app", &loaded).unwrap();

        let reloaded = store.load("user/app").unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(!reloaded.contains("user/app/b"));
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.toml");
        fs::write(&path, "keys = 5").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.load("user"), Err(Error::Parse { .. })));
    }
}
