//! Check-spec codec
//!
//! Validation checks for a key live on its spec key (see
//! [`keyset::name::spec_key_name`]) as flattened metadata:
//!
//! | Spec                            | Metadata                          |
//! |---------------------------------|-----------------------------------|
//! | `"long"`                        | `check/long = ""`                 |
//! | `{ range = "1-10" }`            | `check/range = "1-10"`            |
//! | `{ maxlength = ["5", "10"] }`   | `check/maxlength/#0 = "5"`, `check/maxlength/#1 = "10"` |
//!
//! Encoding always replaces the whole set of `check` entries on the spec
//! key.

use keyset::{Key, KeySet, name};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::array;

/// Metadata name prefix for checks
pub const CHECK: &str = "check";

/// A check specification for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckSpec {
    /// A single check without argument, e.g. `"long"`
    Shorthand(String),
    /// Named checks with their arguments
    Checks(BTreeMap<String, CheckValue>),
}

/// Argument(s) of one named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CheckValue {
    Single(String),
    /// Repeated checks of the same kind, in order
    Many(Vec<String>),
}

impl Default for CheckSpec {
    fn default() -> Self {
        CheckSpec::Checks(BTreeMap::new())
    }
}

impl CheckSpec {
    /// Whether this spec contains no checks at all
    pub fn is_empty(&self) -> bool {
        match self {
            CheckSpec::Shorthand(_) => false,
            CheckSpec::Checks(checks) => checks.is_empty(),
        }
    }

    /// Flattened `check/...` metadata entries for this spec, in order
    pub fn flatten(&self) -> Vec<(String, String)> {
        match self {
            CheckSpec::Shorthand(name) => vec![(format!("{CHECK}/{name}"), String::new())],
            CheckSpec::Checks(checks) => checks
                .iter()
                .flat_map(|(name, value)| match value {
                    CheckValue::Single(v) => vec![(format!("{CHECK}/{name}"), v.clone())],
                    CheckValue::Many(values) => values
                        .iter()
                        .enumerate()
                        .map(|(i, v)| (format!("{CHECK}/{name}/#{i}"), v.clone()))
                        .collect(),
                })
                .collect(),
        }
    }

    /// The spec as it reads back after being stored.
    ///
    /// A single check with empty argument becomes the shorthand form and
    /// empty sequences disappear.
    pub fn canonical(&self) -> CheckSpec {
        let flat = self.flatten();
        from_entries(flat.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }
}

impl fmt::Display for CheckSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckSpec::Shorthand(name) => write!(f, "{name}"),
            CheckSpec::Checks(checks) => {
                let parts: Vec<String> = checks
                    .iter()
                    .map(|(name, value)| match value {
                        CheckValue::Single(v) => format!("{name}={v:?}"),
                        CheckValue::Many(values) => format!("{name}={values:?}"),
                    })
                    .collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
        }
    }
}

/// Whether `name` is a check entry (`check` or `check/...`)
pub fn is_check_meta(name: &str) -> bool {
    name == CHECK
        || name
            .strip_prefix(CHECK)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Read the check spec of the key named `key_name`.
///
/// A missing spec key reads as an empty spec.
pub fn decode(keys: &KeySet, key_name: &str) -> CheckSpec {
    keys.lookup(&name::spec_key_name(key_name))
        .map(decode_key)
        .unwrap_or_default()
}

/// Read the check spec stored on a spec key.
pub fn decode_key(spec_key: &Key) -> CheckSpec {
    from_entries(spec_key.meta_iter())
}

/// Store `spec` as the check spec of the key named `key_name`.
///
/// Creates the spec key if needed and removes every `check` entry that
/// is not part of `spec`.
pub fn encode(keys: &mut KeySet, key_name: &str, spec: &CheckSpec) {
    let spec_name = name::spec_key_name(key_name);
    let target = spec.flatten();
    let spec_key = keys.get_or_create(&spec_name);

    for (meta, value) in &target {
        spec_key.set_meta(meta, value);
    }

    for meta in spec_key.meta_names() {
        if is_check_meta(&meta) && !target.iter().any(|(n, _)| *n == meta) {
            spec_key.remove_meta(&meta);
        }
    }

    log::debug!("Stored {} check entries on {}", target.len(), spec_name);
}

enum Slot {
    Single(String),
    Many(Vec<(usize, String)>),
}

fn from_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> CheckSpec {
    let mut slots: BTreeMap<String, Slot> = BTreeMap::new();

    for (meta, value) in entries {
        let Some(rest) = meta.strip_prefix("check/") else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }

        let indexed = rest
            .rsplit_once('/')
            .and_then(|(name, last)| Some((name, array::parse_index(last.strip_prefix('#')?)?)));

        match indexed {
            Some((name, index)) => match slots.get_mut(name) {
                Some(Slot::Many(items)) => items.push((index, value.to_string())),
                _ => {
                    slots.insert(name.to_string(), Slot::Many(vec![(index, value.to_string())]));
                }
            },
            None => {
                slots.insert(rest.to_string(), Slot::Single(value.to_string()));
            }
        }
    }

    let checks: BTreeMap<String, CheckValue> = slots
        .into_iter()
        .map(|(name, slot)| {
            let value = match slot {
                Slot::Single(v) => CheckValue::Single(v),
                Slot::Many(mut items) => {
                    items.sort_by_key(|(i, _)| *i);
                    CheckValue::Many(items.into_iter().map(|(_, v)| v).collect())
                }
            };
            (name, value)
        })
        .collect();

    if checks.len() == 1
        && let Some((name, CheckValue::Single(value))) = checks.iter().next()
        && value.is_empty()
    {
        return CheckSpec::Shorthand(name.clone());
    }

    CheckSpec::Checks(checks)
}
