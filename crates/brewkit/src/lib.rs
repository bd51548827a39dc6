//! # brewkit
//!
//! Pure Rust library for Homebrew and Mac App Store package management.
//!
//! This crate provides functionality for:
//! - Listing installed taps, formulae and casks
//! - Installing formulae and casks in batches, taps one at a time
//! - Listing and installing App Store apps through `mas`
//! - Categorizing brew and mas failures from their output
//! - Installing Homebrew and `mas` when they are missing
//!
//! ## Example
//!
//! ```no_run
//! use brewkit::{Client, PackageType};
//!
//! let client = Client::new().expect("Homebrew not available");
//!
//! let installed = client.list_names(PackageType::Formula).expect("brew info failed");
//! if !installed.iter().any(|n| n == "jq") {
//!     client.install(PackageType::Formula, &["jq"]).expect("install failed");
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod bootstrap;
pub mod error;
pub mod mas;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use mas::MasCli;
pub use types::{InstalledPackage, MasApp, PackageType};

use backend::{Backend, brew::BrewBackend};

/// High-level client for Homebrew operations.
///
/// The client wraps a backend and provides convenient methods for
/// listing and installing packages.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a new Client with the default backend.
    ///
    /// Returns an error if Homebrew is not installed.
    pub fn new() -> Result<Self> {
        let backend = BrewBackend::new()?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client, installing Homebrew first if it is missing.
    pub fn bootstrap() -> Result<Self> {
        let backend = bootstrap::ensure_homebrew()?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The underlying backend.
    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    // =========================================================================
    // List Operations
    // =========================================================================

    /// List all installed packages of a given type.
    pub fn list_installed(&self, package_type: PackageType) -> Result<Vec<InstalledPackage>> {
        self.backend.list_installed(package_type)
    }

    /// Names of installed packages of a given type.
    ///
    /// Formulae from third-party taps are listed by their tap-qualified name,
    /// which is what `brew install` needs on another machine.
    pub fn list_names(&self, package_type: PackageType) -> Result<Vec<String>> {
        Ok(self
            .backend
            .list_installed(package_type)?
            .into_iter()
            .map(|p| p.full_name)
            .collect())
    }

    /// Every name an installed package answers to, short and tap-qualified.
    pub fn list_identifiers(&self, package_type: PackageType) -> Result<Vec<String>> {
        Ok(self
            .backend
            .list_installed(package_type)?
            .iter()
            .flat_map(|p| p.names().map(str::to_string))
            .collect())
    }

    // =========================================================================
    // Install Operations
    // =========================================================================

    /// Install packages of one type.
    pub fn install(&self, package_type: PackageType, names: &[&str]) -> Result<()> {
        self.backend.install(package_type, names)
    }

    /// Shell form of the command(s) `install` would run.
    pub fn describe_install(package_type: PackageType, names: &[&str]) -> String {
        if package_type.is_batchable() {
            format!(
                "brew {}",
                backend::brew::install_command(package_type, names).join(" ")
            )
        } else {
            names
                .iter()
                .map(|n| format!("brew tap {n}"))
                .collect::<Vec<_>>()
                .join(" && ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::MockBackend;

    #[test]
    fn test_list_names() {
        let mock = MockBackend::new().with_installed(PackageType::Cask, &["firefox", "iterm2"]);
        let client = Client::with_backend(Box::new(mock));
        assert_eq!(
            client.list_names(PackageType::Cask).unwrap(),
            vec!["firefox", "iterm2"]
        );
        assert!(client.list_names(PackageType::Formula).unwrap().is_empty());
    }

    #[test]
    fn test_install_through_client() {
        let mock = MockBackend::new();
        let client = Client::with_backend(Box::new(mock.clone()));
        client.install(PackageType::Formula, &["jq", "fd"]).unwrap();

        assert_eq!(
            mock.calls(),
            vec![(PackageType::Formula, vec!["jq".to_string(), "fd".to_string()])]
        );
        assert_eq!(client.list_names(PackageType::Formula).unwrap(), vec!["jq", "fd"]);
    }

    #[test]
    fn test_describe_install() {
        assert_eq!(
            Client::describe_install(PackageType::Formula, &["jq", "fd"]),
            "brew install --formula jq fd"
        );
        assert_eq!(
            Client::describe_install(PackageType::Cask, &["firefox"]),
            "brew install --cask firefox"
        );
        assert_eq!(
            Client::describe_install(PackageType::Tap, &["a/b", "c/d"]),
            "brew tap a/b && brew tap c/d"
        );
    }
}
