pub mod declarative;
pub mod show;

use anyhow::Result;
use std::path::PathBuf;

use crate::Context;
use crate::config::Manifest;
use crate::engine::Session;

/// Store file for this run: `--store-file`, then the manifest, then the default
fn store_file(ctx: &Context, manifest: &Manifest) -> Result<PathBuf> {
    match &ctx.store_file {
        Some(p) => Ok(p.clone()),
        None => manifest.store_file(),
    }
}

/// Resolve the backend once and load `roots` into a session
pub fn open_session(ctx: &Context, manifest: &Manifest, roots: Vec<String>) -> Result<Session> {
    let kind = ctx.backend.unwrap_or(manifest.backend);
    let store = keyset::backend::resolve(kind, &store_file(ctx, manifest)?)?;
    log::debug!("Backend {kind} resolved to {} store", store.name());
    Session::open(store, roots)
}
