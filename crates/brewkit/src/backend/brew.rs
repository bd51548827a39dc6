//! Real Homebrew CLI backend using `brew` commands.

use crate::backend::Backend;
use crate::error::{Error, Result};
use crate::types::{InstalledPackage, PackageType};
use std::path::PathBuf;
use std::process::Command;

/// Well-known brew locations, checked before PATH.
const BREW_PATHS: [&str; 2] = [
    "/opt/homebrew/bin/brew", // Apple Silicon
    "/usr/local/bin/brew",    // Intel
];

/// Backend that executes real `brew` commands.
pub struct BrewBackend {
    /// Path to the brew executable
    brew_path: PathBuf,
}

impl BrewBackend {
    /// Create a new BrewBackend.
    ///
    /// Returns an error if Homebrew is not installed.
    pub fn new() -> Result<Self> {
        let brew_path = find_brew().ok_or(Error::BrewNotFound)?;
        Ok(Self { brew_path })
    }

    /// Run a brew command and return output.
    fn run_brew(&self, args: &[&str]) -> Result<std::process::Output> {
        log::debug!("brew {}", args.join(" "));
        let output = Command::new(&self.brew_path)
            .args(args)
            .env("HOMEBREW_NO_AUTO_UPDATE", "1")
            .env("HOMEBREW_NO_ENV_HINTS", "1")
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute brew: {e}"),
                stderr: String::new(),
            })?;
        Ok(output)
    }

    /// Run a brew command and check for success.
    fn run_brew_checked(&self, args: &[&str], package_name: Option<&str>) -> Result<String> {
        let output = self.run_brew(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let err = Error::from_brew_output(&stderr, package_name);
            if err.is_ignorable() {
                log::debug!("brew {}: {err}", args.join(" "));
                return Ok(String::from_utf8_lossy(&output.stdout).to_string());
            }
            return Err(err);
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl Backend for BrewBackend {
    fn list_installed(&self, package_type: PackageType) -> Result<Vec<InstalledPackage>> {
        match package_type {
            PackageType::Tap => {
                let output = self.run_brew_checked(&["tap"], None)?;
                Ok(parse_taps(&output))
            }
            PackageType::Formula => {
                let output =
                    self.run_brew_checked(&["info", "--json=v2", "--installed", "--formula"], None)?;
                let json: serde_json::Value = serde_json::from_str(&output)?;
                Ok(parse_installed_formulas(&json))
            }
            PackageType::Cask => {
                let output =
                    self.run_brew_checked(&["info", "--json=v2", "--installed", "--cask"], None)?;
                let json: serde_json::Value = serde_json::from_str(&output)?;
                Ok(parse_installed_casks(&json))
            }
        }
    }

    fn install(&self, package_type: PackageType, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }

        if package_type.is_batchable() {
            let args = install_command(package_type, names);
            self.run_brew_checked(&args, Some(&names.join(", ")))?;
            return Ok(());
        }

        for name in names {
            let args = install_command(package_type, &[*name]);
            self.run_brew_checked(&args, Some(*name))?;
        }
        Ok(())
    }
}

/// Arguments of the brew command that installs `names`.
pub fn install_command<'a>(package_type: PackageType, names: &[&'a str]) -> Vec<&'a str> {
    let mut args: Vec<&str> = package_type.install_args().to_vec();
    args.extend_from_slice(names);
    args
}

/// Find the brew executable path.
pub fn find_brew() -> Option<PathBuf> {
    BREW_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
        .or_else(|| which::which("brew").ok())
}

/// Parse `brew tap` output.
fn parse_taps(output: &str) -> Vec<InstalledPackage> {
    output
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(|l| InstalledPackage::new(l, PackageType::Tap, ""))
        .collect()
}

/// Parse installed formulas from brew info JSON.
fn parse_installed_formulas(json: &serde_json::Value) -> Vec<InstalledPackage> {
    let Some(formulas) = json["formulae"].as_array() else {
        return Vec::new();
    };

    formulas
        .iter()
        .filter_map(|formula| {
            let name = formula["name"].as_str()?;
            let full_name = formula["full_name"].as_str().unwrap_or(name);
            let first = formula["installed"].as_array()?.first()?;
            let version = first["version"].as_str().unwrap_or_default();
            Some(
                InstalledPackage::new(name, PackageType::Formula, version)
                    .with_full_name(full_name),
            )
        })
        .collect()
}

/// Parse installed casks from brew info JSON.
fn parse_installed_casks(json: &serde_json::Value) -> Vec<InstalledPackage> {
    let Some(casks) = json["casks"].as_array() else {
        return Vec::new();
    };

    casks
        .iter()
        .filter_map(|cask| {
            let name = cask["token"].as_str()?;
            let version = cask["installed"].as_str()?;
            Some(InstalledPackage::new(name, PackageType::Cask, version))
        })
        .collect()
}
