//! `show` - print one key as stored

use anyhow::{Context as _, Result, bail};
use keymeta::{CheckSpec, MetaMap, check, comments};
use keyset::{Key, KeySet, name};
use serde::Serialize;

use crate::Context;
use crate::config::Manifest;
use crate::ui;

/// A key with its codec-managed metadata decoded
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct KeyView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub metadata: MetaMap,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    #[serde(skip_serializing_if = "CheckSpec::is_empty")]
    pub check: CheckSpec,
}

impl KeyView {
    pub fn new(key: &Key, keys: &KeySet) -> Self {
        Self {
            name: key.name().to_string(),
            value: key.value().map(ToString::to_string),
            metadata: key
                .meta_iter()
                .filter(|(n, _)| !comments::is_comment_meta(n) && !check::is_check_meta(n))
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            comments: comments::decode(key),
            check: check::decode(keys, key.name()),
        }
    }
}

pub fn run(ctx: &Context, key_name: &str, json: bool) -> Result<()> {
    name::validate(key_name)?;

    // The manifest only picks the backend here; it is optional.
    let manifest = match Manifest::resolve(ctx.manifest.as_deref()) {
        Ok((manifest, _)) => manifest,
        Err(e) if ctx.manifest.is_none() => {
            log::debug!("No manifest, using defaults: {e:#}");
            Manifest::default()
        }
        Err(e) => return Err(e),
    };

    let root = name::top_root(key_name);
    let roots = vec![name::spec_key_name(&root), root];
    let session = super::open_session(ctx, &manifest, roots)?;

    let Some(key) = session.keys().lookup(key_name) else {
        bail!("Key '{key_name}' not found in {} store", session.store_name());
    };
    let view = KeyView::new(key, session.keys());

    if json {
        println!("{}", serde_json::to_string_pretty(&view).context("Failed to serialize key")?);
        return Ok(());
    }

    ui::header(&view.name);
    ui::kv("Value", view.value.as_deref().unwrap_or("(unset)"));

    if !view.metadata.is_empty() {
        ui::section("Metadata");
        for (name, value) in &view.metadata {
            ui::kv(name, value);
        }
    }

    if !view.comments.is_empty() {
        ui::section("Comments");
        for line in view.comments.split('\n') {
            ui::dim(&format!("# {line}"));
        }
    }

    if !view.check.is_empty() {
        ui::section("Check");
        ui::kv("spec", &view.check.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_decodes_codec_metadata() {
        let mut key = Key::new("user/app/port").with_value("8080").with_meta("type", "long");
        comments::encode(&mut key, "first\nsecond");
        let mut keys = KeySet::new();
        check::encode(&mut keys, "user/app/port", &CheckSpec::Shorthand("long".into()));
        keys.insert(key.clone());

        let view = KeyView::new(&key, &keys);
        assert_eq!(view.value.as_deref(), Some("8080"));
        assert_eq!(view.metadata.len(), 1);
        assert_eq!(view.comments, "first\nsecond");
        assert_eq!(view.check, CheckSpec::Shorthand("long".into()));
    }

    #[test]
    fn test_view_json_omits_empty_parts() {
        let key = Key::new("user/app/x");
        let view = KeyView::new(&key, &KeySet::new());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({"name": "user/app/x", "metadata": {}}));
    }
}
