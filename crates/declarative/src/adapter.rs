//! Adapter traits isolating the reconciler from installation backends
//!
//! Every backend (Homebrew, the App Store, direct downloads) is reached only
//! through [`Adapter`]. The git identity is reached through
//! [`IdentityStore`]. Implementations wrap external commands; tests
//! substitute the mocks in [`crate::mock`].

use crate::document::IdentityField;
use crate::types::Category;
use std::collections::BTreeSet;
use thiserror::Error;

/// Errors reported by adapters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// The backend needs a signed-in session
    #[error("{backend} is not signed in")]
    Unauthenticated { backend: String },

    /// The backend's command-line tool is not installed
    #[error("{tool} is not installed")]
    ToolMissing { tool: String },

    /// Bootstrapping a missing tool failed
    #[error("could not install {tool}: {message}")]
    Bootstrap { tool: String, message: String },

    /// The install itself failed
    #[error("{message}")]
    Failed { message: String },

    /// The adapter does not handle this category
    #[error("{category} is not handled by this adapter")]
    Unsupported { category: Category },
}

impl InstallError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Result of a single install call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Installed {
    /// The identifier is now installed
    Done,
    /// No automated installer exists for the identifier
    ManualRequired { reason: String },
}

/// A backend that can report and install identifiers of some categories
pub trait Adapter {
    /// Backend name for logs (e.g. "homebrew")
    fn name(&self) -> &str;

    /// Identifiers currently installed in a category
    ///
    /// Must not mutate the host.
    fn list_installed(&self, category: Category) -> Result<BTreeSet<String>, InstallError>;

    /// Installed identifiers with a display label, for snapshots
    fn list_labeled(&self, category: Category) -> Result<Vec<(String, String)>, InstallError> {
        Ok(self
            .list_installed(category)?
            .into_iter()
            .map(|id| (id.clone(), id))
            .collect())
    }

    /// Make sure the backend tool exists, installing it once if needed
    fn ensure_available(&self, _category: Category) -> Result<(), InstallError> {
        Ok(())
    }

    /// Install one identifier
    fn install(&self, category: Category, identifier: &str) -> Result<Installed, InstallError>;

    /// Whether several identifiers can be installed in one call
    fn supports_batch(&self, _category: Category) -> bool {
        false
    }

    /// Install several identifiers in one call
    ///
    /// Not transactional: on error some identifiers may be installed.
    fn install_batch(&self, category: Category, identifiers: &[&str]) -> Result<(), InstallError> {
        for id in identifiers {
            if let Installed::ManualRequired { reason } = self.install(category, id)? {
                return Err(InstallError::failed(reason));
            }
        }
        Ok(())
    }

    /// Shell-style description of what installing would run (dry run)
    fn describe_install(&self, category: Category, identifiers: &[&str]) -> String {
        format!("{} install {} {}", self.name(), category, identifiers.join(" "))
    }
}

/// Read/write access to the global git identity
pub trait IdentityStore {
    /// Current value, `None` if unset
    fn get(&self, field: IdentityField) -> Result<Option<String>, InstallError>;

    /// Set a value
    fn set(&self, field: IdentityField, value: &str) -> Result<(), InstallError>;
}
