//! One-time installation of missing tools.

use crate::backend::Backend;
use crate::backend::brew::{BrewBackend, find_brew};
use crate::error::{Error, Result};
use crate::mas::{MasCli, find_mas};
use crate::types::PackageType;
use std::process::Command;

/// Official Homebrew install script.
pub const HOMEBREW_INSTALL_URL: &str =
    "https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh";

/// Return a brew backend, installing Homebrew first if needed.
///
/// Runs the official install script non-interactively. The script may ask
/// for an administrator password on the terminal.
pub fn ensure_homebrew() -> Result<BrewBackend> {
    if find_brew().is_some() {
        return BrewBackend::new();
    }

    log::info!("Homebrew not found, running the official installer");
    let script = format!(
        "script=\"$(curl -fsSL {HOMEBREW_INSTALL_URL})\" && /bin/bash -c \"$script\""
    );
    let status = Command::new("/bin/bash")
        .args(["-c", &script])
        .env("NONINTERACTIVE", "1")
        .status()
        .map_err(|e| Error::Bootstrap {
            tool: "brew".to_string(),
            message: format!("failed to run install script: {e}"),
        })?;

    if !status.success() {
        return Err(Error::Bootstrap {
            tool: "brew".to_string(),
            message: format!("install script exited with {status}"),
        });
    }

    // The script installs to a fixed prefix that may not be on PATH yet.
    BrewBackend::new().map_err(|_| Error::Bootstrap {
        tool: "brew".to_string(),
        message: "install script succeeded but brew is still not found".to_string(),
    })
}

/// Return a mas handle, installing the `mas` formula first if needed.
pub fn ensure_mas(brew: &dyn Backend) -> Result<MasCli> {
    if find_mas().is_some() {
        return MasCli::new();
    }

    log::info!("mas not found, installing it with Homebrew");
    brew.install(PackageType::Formula, &["mas"])
        .map_err(|e| Error::Bootstrap {
            tool: "mas".to_string(),
            message: e.detail(),
        })?;

    MasCli::new().map_err(|_| Error::Bootstrap {
        tool: "mas".to_string(),
        message: "brew install succeeded but mas is still not found".to_string(),
    })
}
