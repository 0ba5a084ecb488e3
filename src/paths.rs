//! Path resolution for kdbkey
//!
//! # Environment Variables
//!
//! - `KDBKEY_CONFIG_DIR` - Override config directory (where `keys.toml` lives)
//! - `KDBKEY_STATE_DIR` - Override state directory (default file store)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `KDBKEY_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/kdbkey` (if set)
//! 3. `~/.config/kdbkey`
//!
//! For state_dir():
//! 1. `KDBKEY_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/kdbkey` (if set)
//! 3. `~/.local/state/kdbkey`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "KDBKEY_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "KDBKEY_STATE_DIR";

const APP_DIR: &str = "kdbkey";

/// File name of the default file store inside the state directory
pub const STORE_FILE: &str = "store.toml";

/// Get the kdbkey config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {}: {}", ENV_CONFIG_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the kdbkey state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_state) = std::env::var("XDG_STATE_HOME") {
        let path = PathBuf::from(xdg_state).join(APP_DIR);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_DIR);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Default location of the file store
pub fn default_store_file() -> Result<PathBuf> {
    Ok(state_dir()?.join(STORE_FILE))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as written.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with each variable set (or unset for `None`), then restore them
    fn with_env<R>(vars: &[(&str, Option<&str>)], f: impl FnOnce() -> R) -> R {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let original: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();
        for (key, value) in vars {
            // SAFETY: ENV_LOCK serializes every test touching the environment
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
        let result = f();
        for (key, value) in original {
            // SAFETY: as above
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env(&[(ENV_CONFIG_DIR, Some("/custom/kdbkey/config"))], || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/kdbkey/config"));
        });
    }

    #[test]
    fn test_state_dir_env_override_sets_store_file() {
        with_env(&[(ENV_STATE_DIR, Some("/custom/kdbkey/state"))], || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/custom/kdbkey/state"));
            assert_eq!(
                default_store_file().unwrap(),
                PathBuf::from("/custom/kdbkey/state/store.toml")
            );
        });
    }

    #[test]
    fn test_xdg_state_home() {
        let vars = [(ENV_STATE_DIR, None), ("XDG_STATE_HOME", Some("/tmp/xdg-kdbkey-state"))];
        with_env(&vars, || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/tmp/xdg-kdbkey-state/kdbkey"));
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/keys/store.toml"), home.join("keys").join("store.toml"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$KDBKEY_NONEXISTENT_VAR_4711/file");
        assert_eq!(result, PathBuf::from("/path/$KDBKEY_NONEXISTENT_VAR_4711/file"));
    }
}
