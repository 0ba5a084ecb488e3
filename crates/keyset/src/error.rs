//! Error types for key set persistence.
//!
//! Lookups never fail: a missing key is `None`. Only store access
//! (loading, flushing, validating names) produces an [`Error`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or flushing a key set.
#[derive(Debug, Error)]
pub enum Error {
    /// Key name does not match the namespace grammar
    #[error("invalid key name: {0}")]
    InvalidName(String),

    /// The `kdb` tool is not installed or not in PATH
    #[error("kdb not found. Install libelektra or use the file backend")]
    KdbNotFound,

    /// A `kdb` invocation returned a failure status
    #[error("command failed: {message}")]
    CommandFailed {
        /// What was being attempted
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// Store file could not be parsed
    #[error("failed to parse store file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Key set could not be serialized
    #[error("failed to serialize key set: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a [`Error::CommandFailed`] from a kdb invocation's stderr.
    pub fn from_kdb_output(stderr: &str, action: &str) -> Self {
        Error::CommandFailed {
            message: format!("kdb {action} failed"),
            stderr: stderr.trim().to_string(),
        }
    }
}

/// Result type for key set operations.
pub type Result<T> = std::result::Result<T, Error>;
