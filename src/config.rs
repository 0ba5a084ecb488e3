//! Manifest loading
//!
//! A manifest declares the keys kdbkey manages. It lives in the config
//! directory as `keys.toml` (preferred) or `keys.json`:
//!
//! ```toml
//! backend = "auto"
//!
//! [[key]]
//! name = "user/app/port"
//! value = "8080"
//! metadata = { type = "unsigned_long" }
//! comments = "Port the app listens on"
//! check = { range = "1-65535" }
//! ```

use anyhow::{Context, Result, bail};
use keymeta::{CheckSpec, MetaMap};
use keyset::BackendKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

/// Base name of the manifest file in the config directory
pub const MANIFEST_NAME: &str = "keys";

/// Manifest file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Toml,
    Json,
}

impl ManifestFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }
}

/// Whether a key should exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

/// One managed key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyDecl {
    /// Full key name, e.g. `user/app/port`
    pub name: String,

    #[serde(default)]
    pub ensure: Ensure,

    /// Scalar value; unmanaged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Plain metadata; unmanaged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetaMap>,

    /// Remove metadata not listed in `metadata`
    #[serde(default)]
    pub purge_meta_keys: bool,

    /// Multi-line comment; unmanaged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,

    /// Validation checks stored on the spec key; unmanaged when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckSpec>,
}

impl KeyDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: Ensure::Present,
            value: None,
            metadata: None,
            purge_meta_keys: false,
            comments: None,
            check: None,
        }
    }

    /// Declared properties that have no effect because the key is absent
    pub fn ignored_properties(&self) -> Vec<&'static str> {
        if self.ensure != Ensure::Absent {
            return Vec::new();
        }
        [
            ("value", self.value.is_some()),
            ("metadata", self.metadata.is_some()),
            ("comments", self.comments.is_some()),
            ("check", self.check.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}

/// The kdbkey manifest
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Store backend
    #[serde(default)]
    pub backend: BackendKind,

    /// Location of the file store (`~` and `$VARS` are expanded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<String>,

    /// Managed keys, in apply order
    #[serde(default, rename = "key", alias = "keys")]
    pub keys: Vec<KeyDecl>,
}

impl Manifest {
    /// Parse a manifest from a string
    pub fn parse(content: &str, format: ManifestFormat) -> Result<Self> {
        let manifest: Self = match format {
            ManifestFormat::Toml => toml::from_str(content).context("Invalid TOML manifest")?,
            ManifestFormat::Json => serde_json::from_str(content).context("Invalid JSON manifest")?,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Load a manifest file, picking the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read manifest: {}", path.display()))?;
        Self::parse(&content, ManifestFormat::from_path(path))
            .with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    /// Find the manifest in `dir`, preferring TOML over JSON
    pub fn find(dir: &Path) -> Option<PathBuf> {
        [ManifestFormat::Toml, ManifestFormat::Json]
            .into_iter()
            .map(|f| dir.join(format!("{MANIFEST_NAME}.{}", f.extension())))
            .find(|p| p.exists())
    }

    /// Load the manifest at `path`, or the one in the config directory
    pub fn resolve(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let dir = paths::config_dir()?;
                match Self::find(&dir) {
                    Some(p) => p,
                    None => bail!(
                        "No manifest found in {} (expected {MANIFEST_NAME}.toml or {MANIFEST_NAME}.json)",
                        dir.display()
                    ),
                }
            }
        };
        log::debug!("Loading manifest {}", path.display());
        Ok((Self::load(&path)?, path))
    }

    /// Validate key names and reject duplicates
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for key in &self.keys {
            keyset::name::validate(&key.name).with_context(|| format!("Invalid key '{}'", key.name))?;
            if !seen.insert(key.name.as_str()) {
                bail!("Duplicate key '{}'", key.name);
            }
            let ignored = key.ignored_properties();
            if !ignored.is_empty() {
                log::warn!("{}: ensure = absent, ignoring {}", key.name, ignored.join(", "));
            }
        }
        Ok(())
    }

    /// The file store location, with expansion applied
    pub fn store_file(&self) -> Result<PathBuf> {
        match &self.store_file {
            Some(p) => Ok(paths::expand(p)),
            None => paths::default_store_file(),
        }
    }
}
