//! Installed-state probing

use crate::adapter::{Adapter, IdentityStore, InstallError};
use crate::document::{DirectDownload, IdentityField, StateDocument, StoreApp};
use crate::types::Category;
use std::collections::BTreeSet;

/// Result of probing one category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// The installed identifiers
    Installed(BTreeSet<String>),
    /// The backend is missing or failed; treated as an empty set
    Unavailable {
        installed: BTreeSet<String>,
        warning: String,
    },
    /// The backend needs a signed-in session; the category is skipped
    Unauthenticated { warning: String },
}

impl Probe {
    /// Installed set, if the category can be reconciled
    pub fn installed(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Installed(set) | Self::Unavailable { installed: set, .. } => Some(set),
            Self::Unauthenticated { .. } => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Installed(_) => None,
            Self::Unavailable { warning, .. } | Self::Unauthenticated { warning } => Some(warning),
        }
    }
}

/// The adapters, one per category group
pub struct Backends<'a> {
    /// Taps, formulae and casks
    pub packages: &'a dyn Adapter,
    /// Mac App Store apps
    pub store: &'a dyn Adapter,
    /// Direct-download applications
    pub downloads: &'a dyn Adapter,
    /// Global git identity
    pub identity: &'a dyn IdentityStore,
}

impl<'a> Backends<'a> {
    /// Adapter responsible for a package category
    ///
    /// Returns `None` for the identity category, which goes through
    /// [`IdentityStore`].
    pub fn adapter_for(&self, category: Category) -> Option<&'a dyn Adapter> {
        match category {
            Category::Taps | Category::Formulae | Category::Casks => Some(self.packages),
            Category::StoreApps => Some(self.store),
            Category::DirectDownloads => Some(self.downloads),
            Category::Identity => None,
        }
    }
}

/// Read-only view of what the host currently has
pub struct Prober<'a> {
    backends: &'a Backends<'a>,
}

impl<'a> Prober<'a> {
    pub fn new(backends: &'a Backends<'a>) -> Self {
        Self { backends }
    }

    /// Probe one package category
    ///
    /// Every call queries the backend again; nothing is cached.
    pub fn probe(&self, category: Category) -> Probe {
        let Some(adapter) = self.backends.adapter_for(category) else {
            return Probe::Installed(BTreeSet::new());
        };

        match adapter.list_installed(category) {
            Ok(set) => {
                log::debug!("{}: {} installed", category, set.len());
                Probe::Installed(set)
            }
            Err(e @ InstallError::Unauthenticated { .. }) => {
                let warning = format!("{}: {e}, skipping", category.title());
                log::warn!("{warning}");
                Probe::Unauthenticated { warning }
            }
            Err(e) => {
                let warning = format!(
                    "{}: could not list installed items ({e}), assuming none",
                    category.title()
                );
                log::warn!("{warning}");
                Probe::Unavailable {
                    installed: BTreeSet::new(),
                    warning,
                }
            }
        }
    }

    /// Current value of an identity field
    pub fn identity(&self, field: IdentityField) -> Result<Option<String>, InstallError> {
        self.backends.identity.get(field)
    }

    /// Probe every category into an installed-state snapshot
    ///
    /// Categories that cannot be probed are left empty.
    pub fn snapshot(&self) -> StateDocument {
        let mut doc = StateDocument::default();

        for category in Category::ORDER {
            if category == Category::Identity {
                for field in IdentityField::ALL {
                    match self.identity(field) {
                        Ok(value) => doc.git_identity.set(field, value),
                        Err(e) => log::warn!("Could not read git {}: {e}", field.key()),
                    }
                }
                continue;
            }

            let Some(adapter) = self.backends.adapter_for(category) else {
                continue;
            };
            let labeled = match adapter.list_labeled(category) {
                Ok(items) => items,
                Err(e) => {
                    log::warn!("Snapshot skipped {}: {e}", category.title());
                    continue;
                }
            };

            match category {
                Category::Taps => doc.taps = labeled.into_iter().map(|(id, _)| id).collect(),
                Category::Formulae => {
                    doc.formulae = labeled.into_iter().map(|(id, _)| id).collect();
                }
                Category::Casks => doc.casks = labeled.into_iter().map(|(id, _)| id).collect(),
                Category::StoreApps => {
                    doc.store_apps = labeled
                        .into_iter()
                        .map(|(id, name)| StoreApp { id, name })
                        .collect();
                }
                Category::DirectDownloads => {
                    doc.direct_downloads = labeled
                        .into_iter()
                        .map(|(name, _)| DirectDownload { name })
                        .collect();
                }
                Category::Identity => {}
            }
        }

        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockAdapter, MockIdentity};

    #[test]
    fn test_probe_installed() {
        let packages = MockAdapter::new("brew").with_installed(Category::Formulae, &["git"]);
        let store = MockAdapter::new("mas");
        let downloads = MockAdapter::new("direct");
        let identity = MockIdentity::default();
        let backends = Backends {
            packages: &packages,
            store: &store,
            downloads: &downloads,
            identity: &identity,
        };

        let probe = Prober::new(&backends).probe(Category::Formulae);
        assert_eq!(probe.installed().unwrap().len(), 1);
        assert!(probe.warning().is_none());
    }

    #[test]
    fn test_probe_missing_tool_is_empty_with_warning() {
        let packages = MockAdapter::new("brew").with_list_error(InstallError::ToolMissing {
            tool: "brew".into(),
        });
        let store = MockAdapter::new("mas");
        let downloads = MockAdapter::new("direct");
        let identity = MockIdentity::default();
        let backends = Backends {
            packages: &packages,
            store: &store,
            downloads: &downloads,
            identity: &identity,
        };

        let probe = Prober::new(&backends).probe(Category::Casks);
        assert!(probe.installed().unwrap().is_empty());
        assert!(probe.warning().unwrap().contains("brew is not installed"));
    }

    #[test]
    fn test_probe_unauthenticated_skips() {
        let packages = MockAdapter::new("brew");
        let store = MockAdapter::new("mas").unauthenticated();
        let downloads = MockAdapter::new("direct");
        let identity = MockIdentity::default();
        let backends = Backends {
            packages: &packages,
            store: &store,
            downloads: &downloads,
            identity: &identity,
        };

        let probe = Prober::new(&backends).probe(Category::StoreApps);
        assert!(probe.installed().is_none());
        assert!(matches!(probe, Probe::Unauthenticated { .. }));
    }

    #[test]
    fn test_probe_does_not_install() {
        let packages = MockAdapter::new("brew");
        let store = MockAdapter::new("mas");
        let downloads = MockAdapter::new("direct");
        let identity = MockIdentity::default();
        let backends = Backends {
            packages: &packages,
            store: &store,
            downloads: &downloads,
            identity: &identity,
        };

        let prober = Prober::new(&backends);
        for category in Category::ORDER {
            let _ = prober.probe(category);
        }
        let _ = prober.snapshot();
        assert!(packages.install_calls().is_empty());
        assert!(identity.set_calls().is_empty());
    }

    #[test]
    fn test_snapshot_collects_all_categories() {
        let packages = MockAdapter::new("brew")
            .with_installed(Category::Taps, &["homebrew/cask-fonts"])
            .with_installed(Category::Formulae, &["git", "jq"])
            .with_installed(Category::Casks, &["firefox"]);
        let store = MockAdapter::new("mas")
            .with_labeled(Category::StoreApps, &[("409183694", "Keynote")]);
        let downloads =
            MockAdapter::new("direct").with_installed(Category::DirectDownloads, &["Zoom"]);
        let identity = MockIdentity::with_values(Some("Bob"), None);
        let backends = Backends {
            packages: &packages,
            store: &store,
            downloads: &downloads,
            identity: &identity,
        };

        let doc = Prober::new(&backends).snapshot();
        assert_eq!(doc.taps, vec!["homebrew/cask-fonts"]);
        assert_eq!(doc.formulae, vec!["git", "jq"]);
        assert_eq!(doc.casks, vec!["firefox"]);
        assert_eq!(
            doc.store_apps,
            vec![StoreApp {
                id: "409183694".into(),
                name: "Keynote".into()
            }]
        );
        assert_eq!(doc.direct_downloads[0].name, "Zoom");
        assert_eq!(doc.git_identity.name.as_deref(), Some("Bob"));
        assert!(doc.validate().is_ok());
    }
}
