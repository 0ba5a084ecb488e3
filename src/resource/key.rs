//! Key resource - existence, value, metadata, comments and checks of one key

use anyhow::{Result, bail};
use declarative::{ApplyContext, ApplyResult, Resource, ResourceState};
use keymeta::reconcile::{self, KeyRole};
use keymeta::{CheckSpec, MetaMap, check, comments};
use keyset::{Key, KeySet};
use std::fmt;

use crate::config::{Ensure, KeyDecl};

/// A property of a key that can be managed independently
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProperty {
    Value,
    Metadata,
    Comments,
    Check,
}

impl fmt::Display for KeyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyProperty::Value => write!(f, "value"),
            KeyProperty::Metadata => write!(f, "metadata"),
            KeyProperty::Comments => write!(f, "comments"),
            KeyProperty::Check => write!(f, "check"),
        }
    }
}

/// Desired state of a single key
///
/// Properties left as `None` are not managed: they are neither compared
/// nor written.
#[derive(Debug, Clone)]
pub struct KeyResource {
    pub name: String,
    pub ensure: Ensure,
    pub value: Option<String>,
    pub metadata: Option<MetaMap>,
    pub purge_meta_keys: bool,
    pub comments: Option<String>,
    pub check: Option<CheckSpec>,
}

impl From<KeyDecl> for KeyResource {
    fn from(decl: KeyDecl) -> Self {
        Self {
            name: decl.name,
            ensure: decl.ensure,
            value: decl.value,
            metadata: decl.metadata,
            purge_meta_keys: decl.purge_meta_keys,
            comments: decl.comments,
            check: decl.check,
        }
    }
}

impl KeyResource {
    pub fn new(name: impl Into<String>) -> Self {
        KeyDecl::new(name).into()
    }

    /// The comment as it reads back once stored
    fn stored_comment(&self, comment: &str) -> String {
        let mut scratch = Key::new(self.name.as_str());
        comments::encode(&mut scratch, comment);
        comments::decode(&scratch)
    }

    /// Managed properties of `key` that differ from the desired state
    pub fn changed_properties(&self, key: &Key, keys: &KeySet) -> Vec<KeyProperty> {
        let mut changed = Vec::new();

        if let Some(value) = &self.value
            && key.value() != Some(value.as_str())
        {
            changed.push(KeyProperty::Value);
        }

        if !reconcile::plan(key, self.metadata.as_ref(), self.purge_meta_keys, KeyRole::Managed).is_empty() {
            changed.push(KeyProperty::Metadata);
        }

        if let Some(comment) = &self.comments
            && comments::decode(key) != self.stored_comment(comment)
        {
            changed.push(KeyProperty::Comments);
        }

        if let Some(spec) = &self.check
            && check::decode(keys, &self.name) != spec.canonical()
        {
            changed.push(KeyProperty::Check);
        }

        changed
    }

    /// Write one property into `keys`; the key itself must exist
    fn write_property(&self, keys: &mut KeySet, property: KeyProperty) -> Result<()> {
        if property == KeyProperty::Check {
            if let Some(spec) = &self.check {
                check::encode(keys, &self.name, spec);
            }
            return Ok(());
        }

        let Some(key) = keys.lookup_mut(&self.name) else {
            bail!("Key {} disappeared while applying {property}", self.name);
        };

        match property {
            KeyProperty::Value => {
                if let Some(value) = &self.value {
                    key.set_value(value.as_str());
                }
            }
            KeyProperty::Metadata => {
                let mutation = reconcile::reconcile(
                    key,
                    self.metadata.as_ref(),
                    self.purge_meta_keys,
                    KeyRole::Managed,
                );
                log::debug!(
                    "{}: set {} and removed {} metadata entries",
                    self.name,
                    mutation.set.len(),
                    mutation.remove.len()
                );
            }
            KeyProperty::Comments => {
                if let Some(comment) = &self.comments {
                    comments::encode(key, comment);
                }
            }
            KeyProperty::Check => {}
        }

        Ok(())
    }

    /// Render the managed properties as one line per fact
    fn render(
        &self,
        value: Option<&str>,
        metadata: Option<&MetaMap>,
        comment: Option<&str>,
        check: Option<&CheckSpec>,
    ) -> Option<String> {
        let mut lines = Vec::new();

        if self.value.is_some() {
            match value {
                Some(v) => lines.push(format!("value = {v:?}")),
                None => lines.push("value = (unset)".to_string()),
            }
        }

        if let Some(metadata) = metadata {
            for (name, value) in metadata {
                lines.push(format!("meta {name} = {value:?}"));
            }
        }

        if let Some(comment) = comment
            && !comment.is_empty()
        {
            for line in comment.split('\n') {
                lines.push(format!("comment {line:?}"));
            }
        }

        if let Some(check) = check {
            lines.push(format!("check = {check}"));
        }

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

impl Resource<KeySet> for KeyResource {
    fn id(&self) -> String {
        self.name.clone()
    }

    fn description(&self) -> String {
        match self.ensure {
            Ensure::Present => format!("Manage {}", self.name),
            Ensure::Absent => format!("Remove {}", self.name),
        }
    }

    fn resource_type(&self) -> &'static str {
        super::KEY
    }

    fn current_state(&self, keys: &KeySet) -> Result<ResourceState> {
        let Some(key) = keys.lookup(&self.name) else {
            return Ok(ResourceState::Absent);
        };

        if self.ensure == Ensure::Absent {
            return Ok(ResourceState::Present { details: None });
        }

        let metadata = reconcile::visible(key, self.metadata.as_ref(), self.purge_meta_keys, KeyRole::Managed);
        let comment = self.comments.as_ref().map(|_| comments::decode(key));
        let check = self.check.as_ref().map(|_| check::decode(keys, &self.name));

        Ok(ResourceState::Present {
            details: self.render(key.value(), metadata.as_ref(), comment.as_deref(), check.as_ref()),
        })
    }

    fn desired_state(&self) -> ResourceState {
        if self.ensure == Ensure::Absent {
            return ResourceState::Absent;
        }

        let metadata = self.metadata.as_ref().map(|m| {
            m.iter()
                .filter(|(name, _)| !reconcile::is_reserved(name, KeyRole::Managed))
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect::<MetaMap>()
        });
        let comment = self.comments.as_deref().map(|c| self.stored_comment(c));
        let check = self.check.as_ref().map(CheckSpec::canonical);

        ResourceState::Present {
            details: self.render(self.value.as_deref(), metadata.as_ref(), comment.as_deref(), check.as_ref()),
        }
    }

    fn apply(&self, keys: &mut KeySet, ctx: &mut ApplyContext) -> Result<ApplyResult> {
        if ctx.dry_run {
            return Ok(ApplyResult::Skipped {
                reason: "Dry run".to_string(),
            });
        }

        if self.ensure == Ensure::Absent {
            return Ok(match keys.remove(&self.name) {
                Some(_) => {
                    log::info!("{}: removed", self.name);
                    ApplyResult::Removed
                }
                None => ApplyResult::NoChange,
            });
        }

        let created = !keys.contains(&self.name);
        if created {
            keys.insert(Key::new(self.name.as_str()));
        }

        let changed = match keys.lookup(&self.name) {
            Some(key) => self.changed_properties(key, keys),
            None => bail!("Key {} could not be created", self.name),
        };

        for property in &changed {
            self.write_property(keys, *property)?;
            if !created {
                log::info!("{}: updated {property}", self.name);
            }
        }

        if created {
            log::info!("{}: created", self.name);
            Ok(ApplyResult::Created)
        } else if changed.is_empty() {
            Ok(ApplyResult::NoChange)
        } else {
            Ok(ApplyResult::Modified)
        }
    }
}
