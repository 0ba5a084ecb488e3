//! Metadata reconciler
//!
//! Computes which plain metadata entries a key should end up with, given
//! the entries it has, a desired mapping and a purge policy.
//!
//! Reserved entries are never shown, set or removed here: bookkeeping
//! prefixes (`internal/`, `callback/`), the comment array owned by
//! [`crate::comments`], and on managed keys the checks owned by
//! [`crate::check`].

use keyset::Key;
use std::collections::BTreeMap;

use crate::{check, comments};

/// Desired plain metadata for a key.
pub type MetaMap = BTreeMap<String, String>;

const RESERVED_PREFIXES: &[&str] = &["internal/", "callback/"];

/// Which kind of key the reconciler is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    /// A key managed directly; `check` entries are reserved
    Managed,
    /// A spec key; `check` entries are plain metadata here
    Spec,
}

/// Whether `name` must be left alone by the reconciler.
pub fn is_reserved(name: &str, role: KeyRole) -> bool {
    RESERVED_PREFIXES.iter().any(|p| name.starts_with(p))
        || comments::is_comment_meta(name)
        || (role == KeyRole::Managed && check::is_check_meta(name))
}

/// Metadata changes to apply to a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaMutation {
    /// Entries to create or overwrite
    pub set: Vec<(String, String)>,
    /// Entries to delete
    pub remove: Vec<String>,
}

impl MetaMutation {
    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.remove.is_empty()
    }

    pub fn apply_to(&self, key: &mut Key) {
        for (name, value) in &self.set {
            key.set_meta(name, value);
        }
        for name in &self.remove {
            key.remove_meta(name);
        }
    }
}

/// The metadata state of `key` as seen against `desired`.
///
/// `None` when metadata is not managed. Otherwise every non-reserved
/// entry that is either desired or subject to purging.
pub fn visible(key: &Key, desired: Option<&MetaMap>, purge: bool, role: KeyRole) -> Option<MetaMap> {
    let desired = desired?;
    Some(
        key.meta_iter()
            .filter(|(name, _)| !is_reserved(name, role))
            .filter(|(name, _)| purge || desired.contains_key(*name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    )
}

/// Changes turning the metadata of `key` into `desired`.
pub fn plan(key: &Key, desired: Option<&MetaMap>, purge: bool, role: KeyRole) -> MetaMutation {
    let Some(desired) = desired else {
        return MetaMutation::default();
    };

    let mut mutation = MetaMutation::default();

    for (name, value) in desired {
        if is_reserved(name, role) {
            log::warn!("Ignoring reserved metadata '{}' on {}", name, key.name());
            continue;
        }
        if key.meta(name) != Some(value.as_str()) {
            mutation.set.push((name.clone(), value.clone()));
        }
    }

    if purge {
        mutation.remove = key
            .meta_iter()
            .map(|(name, _)| name)
            .filter(|name| !is_reserved(name, role) && !desired.contains_key(*name))
            .map(ToString::to_string)
            .collect();
    }

    mutation
}

/// Apply `desired` to `key`, returning what was changed.
pub fn reconcile(key: &mut Key, desired: Option<&MetaMap>, purge: bool, role: KeyRole) -> MetaMutation {
    let mutation = plan(key, desired, purge, role);
    mutation.apply_to(key);
    mutation
}
