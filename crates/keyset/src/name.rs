//! Key name grammar and derived names
//!
//! Names are namespace-prefixed paths such as `user/app/port` or
//! `system/hosts/ipv4`. A name starting with `/` is cascading and has no
//! namespace.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Segment inserted after the `spec` namespace to address the check key
/// belonging to a managed key.
pub const CHECK_SEGMENT: &str = "#0#check";

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:user(?::[^/]+)?|system|spec|proc|dir)?(?:/[^/]+)+$")
        .expect("key name pattern is valid")
});

/// Check that `name` follows `(user|system|spec|proc|dir|/)/<segments>`.
pub fn validate(name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(Error::InvalidName(name.to_string()))
    }
}

/// The namespace part of a name, or `None` for cascading names.
pub fn namespace(name: &str) -> Option<&str> {
    match name.find('/') {
        Some(0) | None => None,
        Some(idx) => Some(&name[..idx]),
    }
}

/// The name without its namespace, always starting with `/`.
pub fn strip_namespace(name: &str) -> &str {
    match name.find('/') {
        Some(idx) => &name[idx..],
        None => "/",
    }
}

/// Whether `name` is `root` itself or lies somewhere below it.
pub fn is_below(name: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        return true;
    }
    name == root
        || name
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Name of the key holding the check specification of `name`.
///
/// `user/a/b` and `/a/b` both map to `spec/#0#check/a/b`.
pub fn spec_key_name(name: &str) -> String {
    format!("spec/{CHECK_SEGMENT}{}", strip_namespace(name))
}

/// Namespace plus first path segment, used as the load/flush root.
///
/// `user/app/port` -> `user/app`, `/app/port` -> `/app`.
pub fn top_root(name: &str) -> String {
    let path = strip_namespace(name);
    let first = path
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default();
    match namespace(name) {
        Some(ns) => format!("{ns}/{first}"),
        None => format!("/{first}"),
    }
}
