//! # Keyset
//!
//! In-memory key sets for hierarchical key databases (libelektra style),
//! with pluggable persistence.
//!
//! A batch of changes follows one pattern:
//!
//! 1. [`Store::load`] each root once into a [`KeySet`]
//! 2. look up, create and mutate [`Key`]s in memory
//! 3. [`Store::flush`] each root once at the end
//!
//! If anything fails between 2 and 3, the in-memory changes are simply not
//! persisted; there is no partial flush.
//!
//! ## Example
//!
//! ```
//! use keyset::{Key, Store, backend::memory::MemoryStore};
//!
//! let store = MemoryStore::with_keys([Key::new("user/app/port").with_value("80")]);
//!
//! let mut keys = store.load("user/app")?;
//! keys.get_or_create("user/app/port").set_value("8080");
//! store.flush("user/app", &keys)?;
//!
//! assert_eq!(
//!     store.snapshot().lookup("user/app/port").and_then(Key::value),
//!     Some("8080")
//! );
//! # Ok::<(), keyset::Error>(())
//! ```

pub mod backend;
mod error;
mod key;
mod set;
pub mod name;

pub use backend::{BackendKind, Store};
pub use error::{Error, Result};
pub use key::{Key, MetaEntry};
pub use set::KeySet;
