//! # Keymeta
//!
//! Stateless transformations between declared key properties and the
//! metadata layout of a hierarchical key database.
//!
//! - [`reconcile`]: plain metadata under a purge policy
//! - [`comments`]: multi-line comments as the `comments/#<i>` array
//! - [`check`]: validation checks as `check/...` entries on a spec key
//! - [`array`]: the `<name>/#<index>` convention shared by the codecs
//!
//! None of these functions fail. Entries that do not match the expected
//! layout are ignored when reading.
//!
//! ## Example
//!
//! ```
//! use keyset::{Key, KeySet};
//! use keymeta::{check::CheckSpec, comments};
//!
//! let mut key = Key::new("user/app/port");
//! comments::encode(&mut key, "Port to listen on\nDefaults to 80");
//! assert_eq!(key.meta("comments"), Some("#1"));
//! assert_eq!(comments::decode(&key), "Port to listen on\nDefaults to 80");
//!
//! let mut keys = KeySet::new();
//! keymeta::check::encode(&mut keys, "user/app/port", &CheckSpec::Shorthand("long".into()));
//! assert_eq!(
//!     keymeta::check::decode(&keys, "user/app/port"),
//!     CheckSpec::Shorthand("long".into())
//! );
//! ```

pub mod array;
pub mod check;
pub mod comments;
pub mod reconcile;

pub use check::{CheckSpec, CheckValue};
pub use reconcile::{KeyRole, MetaMap, MetaMutation};
