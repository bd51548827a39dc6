//! Applications installed from vendor downloads

use appkit::{AppInstaller, InstallOutcome};
use declarative::{Adapter, Category, InstallError, Installed};
use std::collections::BTreeSet;

/// Adapter over the direct-download installer registry
pub struct DirectDownloads {
    installer: AppInstaller,
}

impl DirectDownloads {
    pub fn new(installer: AppInstaller) -> Self {
        Self { installer }
    }
}

fn check_category(category: Category) -> Result<(), InstallError> {
    match category {
        Category::DirectDownloads => Ok(()),
        other => Err(InstallError::Unsupported { category: other }),
    }
}

impl Adapter for DirectDownloads {
    fn name(&self) -> &str {
        "download"
    }

    fn list_installed(&self, category: Category) -> Result<BTreeSet<String>, InstallError> {
        check_category(category)?;
        self.installer
            .installed_names()
            .map_err(|e| InstallError::failed(e.to_string()))
    }

    fn install(&self, category: Category, identifier: &str) -> Result<Installed, InstallError> {
        check_category(category)?;
        match self.installer.install(identifier) {
            Ok(InstallOutcome::Installed(path)) => {
                log::info!("Installed {identifier} at {}", path.display());
                Ok(Installed::Done)
            }
            Ok(InstallOutcome::NoInstaller) => Ok(Installed::ManualRequired {
                reason: format!("no installer for {identifier}, install it manually"),
            }),
            Err(e) => {
                log::debug!("{identifier}: {}", e.category().advice());
                Err(InstallError::failed(e.to_string()))
            }
        }
    }

    fn describe_install(&self, _category: Category, identifiers: &[&str]) -> String {
        identifiers
            .iter()
            .map(|id| self.installer.describe(id))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appkit::{ArchiveKind, InstallerSpec, MacTools, MockFetcher, Registry};
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use tempfile::TempDir;

    const URL: &str = "https://example.com/widget.zip";

    fn widget_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("Widget.app/Contents/Info.plist", options)
            .unwrap();
        zip.write_all(b"<plist/>").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn downloads(apps: &TempDir, fetcher: MockFetcher) -> DirectDownloads {
        let mut registry = Registry::new();
        registry.insert(InstallerSpec::new(
            "Widget",
            URL,
            ArchiveKind::Zip,
            "Widget.app",
        ));
        DirectDownloads::new(AppInstaller::with_backends(
            registry,
            apps.path(),
            Arc::new(fetcher),
            Arc::new(MacTools),
        ))
    }

    #[test]
    fn test_unmapped_is_manual_required() {
        let apps = TempDir::new().unwrap();
        let source = downloads(&apps, MockFetcher::new());

        let outcome = source
            .install(Category::DirectDownloads, "WidgetApp")
            .unwrap();
        assert!(matches!(outcome, Installed::ManualRequired { .. }));
    }

    #[test]
    fn test_install_then_listed() {
        let apps = TempDir::new().unwrap();
        let source = downloads(&apps, MockFetcher::new().with_file(URL, widget_zip()));

        assert!(
            !source
                .list_installed(Category::DirectDownloads)
                .unwrap()
                .contains("Widget")
        );
        assert_eq!(
            source.install(Category::DirectDownloads, "Widget").unwrap(),
            Installed::Done
        );
        assert!(
            source
                .list_installed(Category::DirectDownloads)
                .unwrap()
                .contains("Widget")
        );
    }

    #[test]
    fn test_download_failure_is_failed() {
        let apps = TempDir::new().unwrap();
        let source = downloads(&apps, MockFetcher::new());

        let err = source
            .install(Category::DirectDownloads, "Widget")
            .unwrap_err();
        assert!(matches!(err, InstallError::Failed { .. }));
    }

    #[test]
    fn test_describe_install() {
        let apps = TempDir::new().unwrap();
        let source = downloads(&apps, MockFetcher::new());
        let described = source.describe_install(Category::DirectDownloads, &["Widget"]);
        assert!(described.starts_with(&format!("download {URL}")));
    }
}
