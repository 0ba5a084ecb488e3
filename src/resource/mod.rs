//! Resources managed by kdbkey
//!
//! Every managed key is a [`KeyResource`] converging one entry of the
//! shared in-memory [`keyset::KeySet`].

pub mod key;

pub use key::{KeyProperty, KeyResource};

/// Resource type of [`KeyResource`]
pub const KEY: &str = "key";
