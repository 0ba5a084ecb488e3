//! Store backends for loading and flushing key sets.
//!
//! The [`Store`] trait is the only I/O boundary: a batch loads each root
//! once, mutates the in-memory [`KeySet`] and flushes each root once.
//!
//! - [`kdb::KdbStore`] drives the libelektra `kdb` command line tool
//! - [`file::FileStore`] keeps keys in a TOML file
//! - [`memory::MemoryStore`] is an in-process store for tests

pub mod file;
pub mod kdb;
pub mod memory;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::set::KeySet;

/// Persistence for a hierarchical key database.
pub trait Store: Send + Sync {
    /// Short backend name for display
    fn name(&self) -> &'static str;

    /// Check whether the backend can be used on this machine.
    fn is_available(&self) -> bool;

    /// Load every key at or below `root`.
    fn load(&self, root: &str) -> Result<KeySet>;

    /// Persist the keys of `keys` at or below `root`.
    ///
    /// Keys below `root` that exist in the store but not in `keys` are
    /// removed. Keys outside `root` are untouched on both sides.
    fn flush(&self, root: &str, keys: &KeySet) -> Result<()>;
}

/// Which backend to use, as written in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// `kdb` when it is installed, otherwise the file store
    #[default]
    Auto,
    Kdb,
    File,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Auto => write!(f, "auto"),
            BackendKind::Kdb => write!(f, "kdb"),
            BackendKind::File => write!(f, "file"),
        }
    }
}

/// Resolve a backend once at startup.
///
/// `Auto` probes for `kdb` a single time; the result is the store handle
/// passed to everything that needs persistence.
pub fn resolve(kind: BackendKind, store_file: &Path) -> Result<Box<dyn Store>> {
    match kind {
        BackendKind::Kdb => Ok(Box::new(kdb::KdbStore::new()?)),
        BackendKind::File => Ok(Box::new(file::FileStore::new(store_file))),
        BackendKind::Auto => match kdb::KdbStore::new() {
            Ok(store) => {
                log::debug!("Using kdb backend");
                Ok(Box::new(store))
            }
            Err(e) => {
                log::debug!("kdb unavailable ({e}), using file store {}", store_file.display());
                Ok(Box::new(file::FileStore::new(store_file)))
            }
        },
    }
}
