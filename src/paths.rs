//! Path resolution for macsetup
//!
//! # Environment Variables
//!
//! - `MACSETUP_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/macsetup`)
//! - `MACSETUP_STATE_DIR` - Override state directory
//! - `MACSETUP_APPLICATIONS_DIR` - Override where downloaded apps are copied
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `MACSETUP_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/macsetup` (if set to an absolute path)
//! 3. `~/.config/macsetup`
//!
//! For state_dir():
//! 1. `MACSETUP_STATE_DIR` environment variable
//! 2. `XDG_STATE_HOME/macsetup` (if set to an absolute path)
//! 3. `~/.local/state/macsetup`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "MACSETUP_CONFIG_DIR";

/// Environment variable for state directory override
pub const ENV_STATE_DIR: &str = "MACSETUP_STATE_DIR";

/// Environment variable for applications directory override
pub const ENV_APPLICATIONS_DIR: &str = "MACSETUP_APPLICATIONS_DIR";

const APP_NAME: &str = "macsetup";

/// An XDG base directory variable; empty and relative values are ignored
fn xdg_dir(var: &str) -> Option<PathBuf> {
    std::env::var_os(var)
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
}

/// Get the macsetup config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Some(xdg_config) = xdg_dir("XDG_CONFIG_HOME") {
        let path = xdg_config.join(APP_NAME);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_NAME);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the macsetup state directory path
pub fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_STATE_DIR) {
        let path = expand(&dir);
        log::debug!("Using state dir from {}: {}", ENV_STATE_DIR, path.display());
        return Ok(path);
    }

    if let Some(xdg_state) = xdg_dir("XDG_STATE_HOME") {
        let path = xdg_state.join(APP_NAME);
        log::debug!("Using XDG_STATE_HOME: {}", path.display());
        return Ok(path);
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("state").join(APP_NAME);
    log::debug!("Using default state dir: {}", path.display());
    Ok(path)
}

/// Directory holding one log file per run
pub fn logs_dir() -> Result<PathBuf> {
    Ok(state_dir()?.join("logs"))
}

/// Where direct-download applications are installed
pub fn applications_dir() -> PathBuf {
    std::env::var(ENV_APPLICATIONS_DIR)
        .map(|dir| expand(&dir))
        .unwrap_or_else(|_| PathBuf::from("/Applications"))
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    /// Serializes tests that touch the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env<F, R>(vars: &[(&str, Option<&str>)], f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let originals: Vec<_> = vars.iter().map(|(k, _)| (*k, env::var(k).ok())).collect();
        for (key, value) in vars {
            // SAFETY: ENV_LOCK keeps other env-reading tests out
            match value {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }
        let result = f();
        for (key, original) in originals {
            // SAFETY: as above
            match original {
                Some(v) => unsafe { env::set_var(key, v) },
                None => unsafe { env::remove_var(key) },
            }
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env(&[(ENV_CONFIG_DIR, Some("/custom/config/path"))], || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/config/path"));
        });
    }

    #[test]
    fn test_config_dir_env_override_with_tilde() {
        let home = dirs::home_dir().unwrap();
        with_env(&[(ENV_CONFIG_DIR, Some("~/dotfiles/macsetup"))], || {
            assert_eq!(config_dir().unwrap(), home.join("dotfiles").join("macsetup"));
        });
    }

    #[test]
    fn test_xdg_config_home() {
        with_env(
            &[
                (ENV_CONFIG_DIR, None),
                ("XDG_CONFIG_HOME", Some("/tmp/xdg-config-test")),
            ],
            || {
                assert_eq!(
                    config_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-config-test/macsetup")
                );
            },
        );
    }

    #[test]
    fn test_default_config_dir() {
        with_env(&[(ENV_CONFIG_DIR, None), ("XDG_CONFIG_HOME", None)], || {
            let home = dirs::home_dir().unwrap();
            assert_eq!(config_dir().unwrap(), home.join(".config").join("macsetup"));
        });
    }

    #[test]
    fn test_empty_or_relative_xdg_is_ignored() {
        let home = dirs::home_dir().unwrap();
        for value in ["", "relative/config"] {
            with_env(
                &[
                    (ENV_CONFIG_DIR, None),
                    (ENV_STATE_DIR, None),
                    ("XDG_CONFIG_HOME", Some(value)),
                    ("XDG_STATE_HOME", Some(value)),
                ],
                || {
                    assert_eq!(config_dir().unwrap(), home.join(".config").join("macsetup"));
                    assert_eq!(
                        state_dir().unwrap(),
                        home.join(".local").join("state").join("macsetup")
                    );
                },
            );
        }
    }

    #[test]
    fn test_state_dir_env_override() {
        with_env(&[(ENV_STATE_DIR, Some("/custom/state/path"))], || {
            assert_eq!(state_dir().unwrap(), PathBuf::from("/custom/state/path"));
            assert_eq!(
                logs_dir().unwrap(),
                PathBuf::from("/custom/state/path/logs")
            );
        });
    }

    #[test]
    fn test_xdg_state_home() {
        with_env(
            &[
                (ENV_STATE_DIR, None),
                ("XDG_STATE_HOME", Some("/tmp/xdg-state-test")),
            ],
            || {
                assert_eq!(
                    state_dir().unwrap(),
                    PathBuf::from("/tmp/xdg-state-test/macsetup")
                );
            },
        );
    }

    #[test]
    fn test_default_state_dir() {
        with_env(&[(ENV_STATE_DIR, None), ("XDG_STATE_HOME", None)], || {
            let home = dirs::home_dir().unwrap();
            assert_eq!(
                state_dir().unwrap(),
                home.join(".local").join("state").join("macsetup")
            );
        });
    }

    #[test]
    fn test_applications_dir() {
        with_env(&[(ENV_APPLICATIONS_DIR, None)], || {
            assert_eq!(applications_dir(), PathBuf::from("/Applications"));
        });
        with_env(&[(ENV_APPLICATIONS_DIR, Some("/tmp/apps"))], || {
            assert_eq!(applications_dir(), PathBuf::from("/tmp/apps"));
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/test/path"), home.join("test").join("path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_VAR_12345/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_VAR_12345/file"));
    }
}
