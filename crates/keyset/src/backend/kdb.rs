//! libelektra backend using the `kdb` command line tool.

use std::process::{Command, Output};

use crate::backend::Store;
use crate::error::{Error, Result};
use crate::key::Key;
use crate::name;
use crate::set::KeySet;

/// Backend that executes `kdb` commands.
#[derive(Debug, Clone)]
pub struct KdbStore {
    kdb_path: String,
}

/// A single mutation issued against the key database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KdbOp {
    Remove { name: String },
    SetValue { name: String, value: String },
    SetMeta { name: String, meta: String, value: String },
    RemoveMeta { name: String, meta: String },
}

impl KdbOp {
    /// Arguments for the `kdb` invocation performing this operation
    pub fn args(&self) -> Vec<&str> {
        match self {
            KdbOp::Remove { name } => vec!["rm", name.as_str()],
            KdbOp::SetValue { name, value } => vec!["set", "--", name.as_str(), value.as_str()],
            KdbOp::SetMeta { name, meta, value } => {
                vec!["setmeta", "--", name.as_str(), meta.as_str(), value.as_str()]
            }
            KdbOp::RemoveMeta { name, meta } => {
                vec!["rmmeta", "--", name.as_str(), meta.as_str()]
            }
        }
    }
}

impl KdbStore {
    /// Create a KdbStore using `kdb` from PATH.
    ///
    /// Returns [`Error::KdbNotFound`] if `kdb --version` cannot be run.
    pub fn new() -> Result<Self> {
        Self::with_path("kdb")
    }

    pub fn with_path(kdb_path: impl Into<String>) -> Result<Self> {
        let store = Self {
            kdb_path: kdb_path.into(),
        };
        if !store.is_available() {
            return Err(Error::KdbNotFound);
        }
        Ok(store)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        log::trace!("{} {}", self.kdb_path, args.join(" "));
        Command::new(&self.kdb_path)
            .args(args)
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute kdb: {e}"),
                stderr: String::new(),
            })
    }

    fn run_checked(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::from_kdb_output(&stderr, args.first().unwrap_or(&"")));
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Names at or below `root`; an empty subtree lists nothing and exits 0
    fn list(&self, root: &str) -> Result<Vec<String>> {
        Ok(parse_lines(&self.run_checked(&["ls", root])?))
    }

    fn read_key(&self, name: &str) -> Result<Key> {
        let mut key = Key::new(name);

        let output = self.run(&["get", name])?;
        if output.status.success() {
            key.set_value(strip_newline(&String::from_utf8_lossy(&output.stdout)));
        }

        for meta in parse_lines(&self.run_checked(&["lsmeta", name])?) {
            let value = self.run_checked(&["getmeta", name, &meta])?;
            key.set_meta(&meta, strip_newline(&value));
        }

        Ok(key)
    }

    fn execute(&self, op: &KdbOp) -> Result<()> {
        self.run_checked(&op.args())?;
        Ok(())
    }
}

impl Store for KdbStore {
    fn name(&self) -> &'static str {
        "kdb"
    }

    fn is_available(&self) -> bool {
        self.run(&["--version"])
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn load(&self, root: &str) -> Result<KeySet> {
        let mut keys = KeySet::new();
        for name in self.list(root)? {
            if name::is_below(&name, root) {
                keys.insert(self.read_key(&name)?);
            }
        }
        log::debug!("Loaded {} keys below {} via kdb", keys.len(), root);
        Ok(keys)
    }

    fn flush(&self, root: &str, keys: &KeySet) -> Result<()> {
        let stored = self.load(root)?;
        let ops = flush_ops(root, &stored, keys);
        log::debug!("Flushing {} with {} kdb operations", root, ops.len());
        for op in &ops {
            self.execute(op)?;
        }
        Ok(())
    }
}

/// Operations turning `stored` into `desired` for keys at or below `root`.
///
/// Stale keys are removed first, then each remaining key gets its value
/// written, stale metadata removed and changed metadata set.
pub fn flush_ops(root: &str, stored: &KeySet, desired: &KeySet) -> Vec<KdbOp> {
    let mut ops = Vec::new();

    for key in stored.below(root) {
        if !desired.contains(key.name()) {
            ops.push(KdbOp::Remove {
                name: key.name().to_string(),
            });
        }
    }

    for key in desired.below(root) {
        let current = stored.lookup(key.name());
        let value = key.value().unwrap_or_default();

        if current.and_then(Key::value) != Some(value) {
            ops.push(KdbOp::SetValue {
                name: key.name().to_string(),
                value: value.to_string(),
            });
        }

        if let Some(current) = current {
            for (meta, _) in current.meta_iter() {
                if !key.has_meta(meta) {
                    ops.push(KdbOp::RemoveMeta {
                        name: key.name().to_string(),
                        meta: meta.to_string(),
                    });
                }
            }
        }

        for (meta, value) in key.meta_iter() {
            if current.and_then(|c| c.meta(meta)) != Some(value) {
                ops.push(KdbOp::SetMeta {
                    name: key.name().to_string(),
                    meta: meta.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    ops
}

fn parse_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn strip_newline(s: &str) -> &str {
    s.strip_suffix('\n').unwrap_or(s)
}
