//! Backend abstraction for Homebrew operations.
//!
//! The [`Backend`] trait defines the interface for interacting with Homebrew,
//! allowing for different implementations (real CLI, mock for testing).
//!
//! # Testing
//!
//! Use [`MockBackend`] for testing without Homebrew:
//!
//! ```
//! use brewkit::backend::{Backend, MockBackend};
//! use brewkit::PackageType;
//!
//! let mock = MockBackend::new().with_installed(PackageType::Formula, &["git"]);
//! mock.install(PackageType::Formula, &["jq"]).unwrap();
//!
//! let names: Vec<_> = mock
//!     .list_installed(PackageType::Formula)
//!     .unwrap()
//!     .into_iter()
//!     .map(|p| p.name)
//!     .collect();
//! assert_eq!(names, vec!["git", "jq"]);
//! ```

pub mod brew;

use crate::error::{Error, Result};
use crate::types::{InstalledPackage, PackageType};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// Backend trait for Homebrew operations.
///
/// This trait abstracts the underlying Homebrew implementation, enabling:
/// - Real CLI execution via `brew` command
/// - Mock implementations for testing
pub trait Backend: Send + Sync {
    /// List all installed packages of a given type.
    fn list_installed(&self, package_type: PackageType) -> Result<Vec<InstalledPackage>>;

    /// Install packages of one type.
    ///
    /// Formulae and casks are installed in one call. Taps are added one at a
    /// time and the first failure is returned.
    fn install(&self, package_type: PackageType, names: &[&str]) -> Result<()>;
}

/// Mock backend for testing without Homebrew.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    installed: Arc<Mutex<Vec<InstalledPackage>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<Vec<(PackageType, Vec<String>)>>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark packages as installed.
    #[must_use]
    pub fn with_installed(self, package_type: PackageType, names: &[&str]) -> Self {
        if let Ok(mut installed) = self.installed.lock() {
            for name in names {
                installed.push(InstalledPackage::new(*name, package_type, "1.0"));
            }
        }
        self
    }

    /// Add one installed package record.
    #[must_use]
    pub fn with_package(self, package: InstalledPackage) -> Self {
        if let Ok(mut installed) = self.installed.lock() {
            installed.push(package);
        }
        self
    }

    /// Make installs of a package fail as if brew could not find it.
    #[must_use]
    pub fn failing(self, name: &str) -> Self {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(name.to_string());
        }
        self
    }

    /// Every install call made so far.
    pub fn calls(&self) -> Vec<(PackageType, Vec<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Backend for MockBackend {
    fn list_installed(&self, package_type: PackageType) -> Result<Vec<InstalledPackage>> {
        let installed = self
            .installed
            .lock()
            .map_err(|_| Error::Other("mock state poisoned".to_string()))?;
        Ok(installed
            .iter()
            .filter(|p| p.package_type == package_type)
            .cloned()
            .collect())
    }

    fn install(&self, package_type: PackageType, names: &[&str]) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((package_type, names.iter().map(|n| (*n).to_string()).collect()));
        }

        let failing = self
            .failing
            .lock()
            .map_err(|_| Error::Other("mock state poisoned".to_string()))?
            .clone();
        let mut installed = self
            .installed
            .lock()
            .map_err(|_| Error::Other("mock state poisoned".to_string()))?;

        let mut first_failure = None;
        for name in names {
            if failing.contains(*name) {
                first_failure.get_or_insert_with(|| (*name).to_string());
                continue;
            }
            installed.push(InstalledPackage::new(*name, package_type, "1.0"));
        }

        match first_failure {
            Some(name) => Err(Error::NotFound { name }),
            None => Ok(()),
        }
    }
}
