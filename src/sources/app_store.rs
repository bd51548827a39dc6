//! Mac App Store apps through `mas`

use super::{Homebrew, from_brew_error};
use brewkit::MasCli;
use brewkit::bootstrap::ensure_mas;
use declarative::{Adapter, Category, InstallError, Installed};
use std::cell::OnceCell;
use std::collections::BTreeSet;

/// Adapter over the `mas` command line
///
/// `mas` is installed with Homebrew when missing, so this adapter borrows
/// the Homebrew adapter for bootstrapping.
pub struct AppStore<'a> {
    homebrew: &'a Homebrew,
    mas: OnceCell<MasCli>,
}

impl<'a> AppStore<'a> {
    pub fn new(homebrew: &'a Homebrew) -> Self {
        let mas = OnceCell::new();
        match MasCli::new() {
            Ok(found) => {
                let _ = mas.set(found);
            }
            Err(e) => log::debug!("mas unavailable: {e}"),
        }
        Self { homebrew, mas }
    }

    fn mas(&self) -> Result<&MasCli, InstallError> {
        self.mas.get().ok_or_else(|| InstallError::ToolMissing {
            tool: "mas".to_string(),
        })
    }
}

fn check_category(category: Category) -> Result<(), InstallError> {
    match category {
        Category::StoreApps => Ok(()),
        other => Err(InstallError::Unsupported { category: other }),
    }
}

impl Adapter for AppStore<'_> {
    fn name(&self) -> &str {
        "mas"
    }

    fn list_installed(&self, category: Category) -> Result<BTreeSet<String>, InstallError> {
        Ok(self
            .list_labeled(category)?
            .into_iter()
            .map(|(id, _)| id)
            .collect())
    }

    fn list_labeled(&self, category: Category) -> Result<Vec<(String, String)>, InstallError> {
        check_category(category)?;
        let apps = self.mas()?.list().map_err(from_brew_error)?;
        Ok(apps.into_iter().map(|app| (app.id, app.name)).collect())
    }

    fn ensure_available(&self, category: Category) -> Result<(), InstallError> {
        check_category(category)?;
        if self.mas.get().is_some() {
            return Ok(());
        }
        let brew = self.homebrew.bootstrap()?;
        let mas = ensure_mas(brew.backend()).map_err(from_brew_error)?;
        let _ = self.mas.set(mas);
        Ok(())
    }

    fn install(&self, category: Category, identifier: &str) -> Result<Installed, InstallError> {
        check_category(category)?;
        self.mas()?.install(identifier).map_err(from_brew_error)?;
        Ok(Installed::Done)
    }

    fn describe_install(&self, _category: Category, identifiers: &[&str]) -> String {
        identifiers
            .iter()
            .map(|id| format!("mas install {id}"))
            .collect::<Vec<_>>()
            .join(" && ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewkit::Client;
    use brewkit::backend::MockBackend;

    fn store(homebrew: &Homebrew) -> AppStore<'_> {
        AppStore {
            homebrew,
            mas: OnceCell::new(),
        }
    }

    #[test]
    fn test_missing_mas_is_tool_missing() {
        let homebrew = Homebrew::with_client(Client::with_backend(Box::new(MockBackend::new())));
        let store = store(&homebrew);

        assert_eq!(
            store.list_installed(Category::StoreApps).unwrap_err(),
            InstallError::ToolMissing {
                tool: "mas".to_string()
            }
        );
        assert!(matches!(
            store.install(Category::StoreApps, "409183694"),
            Err(InstallError::ToolMissing { .. })
        ));
    }

    #[test]
    fn test_other_categories_unsupported() {
        let homebrew = Homebrew::with_client(Client::with_backend(Box::new(MockBackend::new())));
        let store = store(&homebrew);
        assert!(matches!(
            store.list_installed(Category::Casks),
            Err(InstallError::Unsupported { .. })
        ));
        assert!(!store.supports_batch(Category::StoreApps));
    }

    #[test]
    fn test_describe_install() {
        let homebrew = Homebrew::with_client(Client::with_backend(Box::new(MockBackend::new())));
        let store = store(&homebrew);
        assert_eq!(
            store.describe_install(Category::StoreApps, &["409183694", "497799835"]),
            "mas install 409183694 && mas install 497799835"
        );
    }
}
