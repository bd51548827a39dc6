//! Homebrew taps, formulae and casks

use super::from_brew_error;
use brewkit::{Client, PackageType};
use declarative::{Adapter, Category, InstallError, Installed};
use std::cell::OnceCell;
use std::collections::BTreeSet;

/// Adapter over the `brew` command line
///
/// Created without a client when brew is missing; the first
/// `ensure_available` installs Homebrew. The outcome of that attempt is
/// kept, so a failed install is not retried for later categories.
pub struct Homebrew {
    client: OnceCell<Result<Client, InstallError>>,
    installer: fn() -> brewkit::Result<Client>,
}

impl Default for Homebrew {
    fn default() -> Self {
        Self::new()
    }
}

impl Homebrew {
    /// Use brew if it is installed
    pub fn new() -> Self {
        let client = OnceCell::new();
        match Client::new() {
            Ok(found) => {
                let _ = client.set(Ok(found));
            }
            Err(e) => log::debug!("Homebrew unavailable: {e}"),
        }
        Self {
            client,
            installer: Client::bootstrap,
        }
    }

    /// Use a specific client
    #[cfg(test)]
    pub fn with_client(client: Client) -> Self {
        Self {
            client: OnceCell::from(Ok(client)),
            installer: Client::bootstrap,
        }
    }

    /// Start without brew and install it with `installer`
    #[cfg(test)]
    pub fn with_installer(installer: fn() -> brewkit::Result<Client>) -> Self {
        Self {
            client: OnceCell::new(),
            installer,
        }
    }

    fn client(&self) -> Result<&Client, InstallError> {
        match self.client.get() {
            Some(Ok(client)) => Ok(client),
            _ => Err(InstallError::ToolMissing {
                tool: "brew".to_string(),
            }),
        }
    }

    /// Install Homebrew if it is missing
    ///
    /// Runs the installer at most once per adapter.
    pub fn bootstrap(&self) -> Result<&Client, InstallError> {
        self.client
            .get_or_init(|| {
                log::info!("Installing Homebrew");
                (self.installer)().map_err(from_brew_error)
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}

fn package_type(category: Category) -> Result<PackageType, InstallError> {
    match category {
        Category::Taps => Ok(PackageType::Tap),
        Category::Formulae => Ok(PackageType::Formula),
        Category::Casks => Ok(PackageType::Cask),
        other => Err(InstallError::Unsupported { category: other }),
    }
}

impl Adapter for Homebrew {
    fn name(&self) -> &str {
        "homebrew"
    }

    fn list_installed(&self, category: Category) -> Result<BTreeSet<String>, InstallError> {
        let package_type = package_type(category)?;
        let names = self
            .client()?
            .list_identifiers(package_type)
            .map_err(from_brew_error)?;
        Ok(names.into_iter().collect())
    }

    fn list_labeled(&self, category: Category) -> Result<Vec<(String, String)>, InstallError> {
        let package_type = package_type(category)?;
        let names = self
            .client()?
            .list_names(package_type)
            .map_err(from_brew_error)?;
        Ok(names.into_iter().map(|n| (n.clone(), n)).collect())
    }

    fn ensure_available(&self, _category: Category) -> Result<(), InstallError> {
        self.bootstrap().map(|_| ())
    }

    fn install(&self, category: Category, identifier: &str) -> Result<Installed, InstallError> {
        self.install_batch(category, &[identifier])?;
        Ok(Installed::Done)
    }

    fn supports_batch(&self, category: Category) -> bool {
        package_type(category).is_ok_and(|t| t.is_batchable())
    }

    fn install_batch(&self, category: Category, identifiers: &[&str]) -> Result<(), InstallError> {
        let package_type = package_type(category)?;
        self.client()?
            .install(package_type, identifiers)
            .map_err(from_brew_error)
    }

    fn describe_install(&self, category: Category, identifiers: &[&str]) -> String {
        match package_type(category) {
            Ok(package_type) => Client::describe_install(package_type, identifiers),
            Err(_) => format!("brew install {}", identifiers.join(" ")),
        }
    }
}
