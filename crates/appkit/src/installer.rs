//! Installing applications from vendor downloads.

use crate::bundle::{copy_bundle, extract_zip, find_bundle, find_package};
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::platform::Arch;
use crate::registry::Registry;
use crate::system::{MacTools, MountedImage, SystemTools};
use crate::types::{ArchiveKind, InstallOutcome, InstallerSpec};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where packages install their bundles, regardless of the configured
/// applications directory.
const SYSTEM_APPLICATIONS: &str = "/Applications";

/// Installs registry applications into an applications directory.
pub struct AppInstaller {
    registry: Registry,
    applications_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
    tools: Arc<dyn SystemTools>,
    arch: Arch,
}

impl AppInstaller {
    /// Installer using HTTP downloads and the real system tools.
    pub fn new(registry: Registry, applications_dir: impl Into<PathBuf>) -> Self {
        Self::with_backends(
            registry,
            applications_dir,
            Arc::new(HttpFetcher::new()),
            Arc::new(MacTools),
        )
    }

    /// Installer with custom download and system backends.
    pub fn with_backends(
        registry: Registry,
        applications_dir: impl Into<PathBuf>,
        fetcher: Arc<dyn Fetcher>,
        tools: Arc<dyn SystemTools>,
    ) -> Self {
        Self {
            registry,
            applications_dir: applications_dir.into(),
            fetcher,
            tools,
            arch: Arch::detect(),
        }
    }

    /// Override the detected architecture.
    #[must_use]
    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Installers this instance knows about.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Directory bundles are copied into.
    pub fn applications_dir(&self) -> &Path {
        &self.applications_dir
    }

    /// Whether the bundle for `name` is in the applications directory.
    pub fn is_installed(&self, name: &str) -> bool {
        self.applications_dir
            .join(self.registry.bundle_for(name))
            .exists()
    }

    /// Names of installed applications.
    ///
    /// Registry entries whose bundle is present are reported under their
    /// registry name; every other `Foo.app` is reported as `Foo`.
    pub fn installed_names(&self) -> Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        let entries = match fs::read_dir(&self.applications_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(Error::io(&self.applications_dir, e)),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("app")
                && let Some(stem) = path.file_stem()
            {
                names.insert(stem.to_string_lossy().into_owned());
            }
        }

        for spec in self.registry.iter() {
            if spec.installed_path(&self.applications_dir).exists() {
                names.insert(spec.name.clone());
            }
        }
        Ok(names)
    }

    /// What installing `name` would do.
    pub fn describe(&self, name: &str) -> String {
        match self.registry.get(name) {
            Some(spec) => format!(
                "download {} ({}) and install {}",
                spec.resolved_url(self.arch),
                spec.kind,
                spec.bundle
            ),
            None => format!("no installer for {name}, install it manually"),
        }
    }

    /// Install the application registered under `name`.
    pub fn install(&self, name: &str) -> Result<InstallOutcome> {
        let Some(spec) = self.registry.get(name) else {
            log::info!("No installer registered for {name}");
            return Ok(InstallOutcome::NoInstaller);
        };
        self.install_spec(spec).map(InstallOutcome::Installed)
    }

    fn install_spec(&self, spec: &InstallerSpec) -> Result<PathBuf> {
        // Declared before any mount guard so it is removed after unmounting.
        let scratch = tempfile::Builder::new()
            .prefix("macsetup-")
            .tempdir()
            .map_err(|e| Error::io(std::env::temp_dir(), e))?;

        let archive = scratch.path().join(spec.archive_name());
        self.fetcher.fetch(&spec.resolved_url(self.arch), &archive)?;

        let installed = match spec.kind {
            ArchiveKind::Dmg => self.install_from_image(spec, &archive)?,
            ArchiveKind::Pkg => {
                self.tools.install_pkg(&archive)?;
                spec.installed_path(Path::new(SYSTEM_APPLICATIONS))
            }
            ArchiveKind::Zip => {
                let extracted = scratch.path().join("extracted");
                extract_zip(&archive, &extracted)?;
                let bundle = find_bundle(&extracted, &spec.bundle).ok_or_else(|| {
                    Error::BundleNotFound {
                        bundle: spec.bundle.clone(),
                        archive: spec.archive_name(),
                    }
                })?;
                copy_bundle(&bundle, &self.applications_dir)?
            }
        };

        if let Err(e) = scratch.close() {
            log::warn!("Failed to remove scratch directory: {e}");
        }
        Ok(installed)
    }

    fn install_from_image(&self, spec: &InstallerSpec, image: &Path) -> Result<PathBuf> {
        let mounted = MountedImage::attach(self.tools.as_ref(), image)?;

        if let Some(bundle) = find_bundle(mounted.path(), &spec.bundle) {
            return copy_bundle(&bundle, &self.applications_dir);
        }

        if let Some(pkg) = find_package(mounted.path()) {
            self.tools.install_pkg(&pkg)?;
            return Ok(spec.installed_path(Path::new(SYSTEM_APPLICATIONS)));
        }

        Err(Error::BundleNotFound {
            bundle: spec.bundle.clone(),
            archive: spec.archive_name(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;
    use crate::system::fake::{Event, FakeTools};
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    const URL: &str = "https://example.com/widget";

    fn widget_zip() -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        zip.add_directory("Widget.app/Contents/", options).unwrap();
        zip.start_file("Widget.app/Contents/Info.plist", options)
            .unwrap();
        zip.write_all(b"<plist/>").unwrap();
        zip.finish().unwrap().into_inner()
    }

    fn registry(kind: ArchiveKind) -> Registry {
        let mut registry = Registry::new();
        registry.insert(InstallerSpec::new("Widget", URL, kind, "Widget.app"));
        registry
    }

    fn installer(
        kind: ArchiveKind,
        apps: &Path,
        fetcher: &MockFetcher,
        tools: &Arc<FakeTools>,
    ) -> AppInstaller {
        AppInstaller::with_backends(
            registry(kind),
            apps,
            Arc::new(fetcher.clone()),
            tools.clone(),
        )
    }

    #[test]
    fn test_unmapped_name_needs_manual_install() {
        let apps = TempDir::new().unwrap();
        let fetcher = MockFetcher::new();
        let tools = Arc::new(FakeTools::new("/Volumes/none"));
        let installer = installer(ArchiveKind::Dmg, apps.path(), &fetcher, &tools);

        assert_eq!(
            installer.install("WidgetApp").unwrap(),
            InstallOutcome::NoInstaller
        );
        assert!(fetcher.requests().is_empty());
        assert!(installer.describe("WidgetApp").contains("manually"));
    }

    #[test]
    fn test_zip_install_copies_bundle() {
        let apps = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().with_file(URL, widget_zip());
        let tools = Arc::new(FakeTools::new("/Volumes/none"));
        let installer = installer(ArchiveKind::Zip, apps.path(), &fetcher, &tools);

        assert!(!installer.is_installed("Widget"));
        let outcome = installer.install("Widget").unwrap();

        assert_eq!(
            outcome,
            InstallOutcome::Installed(apps.path().join("Widget.app"))
        );
        assert!(apps.path().join("Widget.app/Contents/Info.plist").exists());
        assert!(installer.is_installed("Widget"));
        assert!(tools.events().is_empty());
    }

    #[test]
    fn test_zip_without_bundle_is_bundle_not_found() {
        let apps = TempDir::new().unwrap();
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("README.txt", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"hi").unwrap();
        let data = zip.finish().unwrap().into_inner();

        let fetcher = MockFetcher::new().with_file(URL, data);
        let tools = Arc::new(FakeTools::new("/Volumes/none"));
        let installer = installer(ArchiveKind::Zip, apps.path(), &fetcher, &tools);

        let err = installer.install("Widget").unwrap_err();
        assert!(matches!(err, Error::BundleNotFound { .. }));
        assert!(!installer.is_installed("Widget"));
        let archive = &fetcher.destinations()[0];
        assert!(!archive.parent().unwrap().exists());
    }

    #[test]
    fn test_dmg_install_mounts_copies_and_detaches() {
        let apps = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        fs::create_dir_all(volume.path().join("Widget.app/Contents")).unwrap();
        fs::write(volume.path().join("Widget.app/Contents/Info.plist"), "x").unwrap();

        let fetcher = MockFetcher::new().with_file(URL, b"dmg".to_vec());
        let tools = Arc::new(FakeTools::new(volume.path()));
        let installer = installer(ArchiveKind::Dmg, apps.path(), &fetcher, &tools);

        installer.install("Widget").unwrap();

        assert!(apps.path().join("Widget.app/Contents/Info.plist").exists());
        let events = tools.events();
        assert_eq!(events.len(), 2);
        let Event::Attach(image) = &events[0] else {
            panic!("expected attach first, got {events:?}");
        };
        assert_eq!(events[1], Event::Detach(volume.path().to_path_buf()));
        // Scratch directory is gone once the install returns.
        assert!(!image.exists());
        assert!(!image.parent().unwrap().exists());
    }

    #[test]
    fn test_dmg_with_package_runs_installer() {
        let apps = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        fs::write(volume.path().join("Install Widget.pkg"), b"xar!").unwrap();

        let fetcher = MockFetcher::new().with_file(URL, b"dmg".to_vec());
        let tools = Arc::new(FakeTools::new(volume.path()));
        let installer = installer(ArchiveKind::Dmg, apps.path(), &fetcher, &tools);

        installer.install("Widget").unwrap();

        let events = tools.events();
        assert_eq!(
            events[1],
            Event::InstallPkg(volume.path().join("Install Widget.pkg"))
        );
        assert!(matches!(events[2], Event::Detach(_)));
    }

    #[test]
    fn test_dmg_without_bundle_still_detaches() {
        let apps = TempDir::new().unwrap();
        let volume = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().with_file(URL, b"dmg".to_vec());
        let tools = Arc::new(FakeTools::new(volume.path()));
        let installer = installer(ArchiveKind::Dmg, apps.path(), &fetcher, &tools);

        let err = installer.install("Widget").unwrap_err();

        assert!(matches!(err, Error::BundleNotFound { .. }));
        let events = tools.events();
        assert!(matches!(events.last(), Some(Event::Detach(_))));
        let Event::Attach(image) = &events[0] else {
            panic!("expected attach first, got {events:?}");
        };
        assert!(!image.parent().unwrap().exists());
    }

    #[test]
    fn test_pkg_failure_is_command_failure() {
        let apps = TempDir::new().unwrap();
        let fetcher = MockFetcher::new().with_file(URL, b"xar!".to_vec());
        let mut fake = FakeTools::new("/Volumes/none");
        fake.fail_pkg = true;
        let tools = Arc::new(fake);
        let installer = installer(ArchiveKind::Pkg, apps.path(), &fetcher, &tools);

        let err = installer.install("Widget").unwrap_err();
        assert!(matches!(err, Error::CommandFailed { .. }));
        let events = tools.events();
        let Event::InstallPkg(pkg) = &events[0] else {
            panic!("expected installer run, got {events:?}");
        };
        assert!(!pkg.parent().unwrap().exists());
    }

    #[test]
    fn test_download_failure_touches_nothing() {
        let apps = TempDir::new().unwrap();
        let fetcher = MockFetcher::new();
        let tools = Arc::new(FakeTools::new("/Volumes/none"));
        let installer = installer(ArchiveKind::Dmg, apps.path(), &fetcher, &tools);

        let err = installer.install("Widget").unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
        assert!(tools.events().is_empty());
    }

    #[test]
    fn test_installed_names() {
        let apps = TempDir::new().unwrap();
        fs::create_dir_all(apps.path().join("Widget.app")).unwrap();
        fs::create_dir_all(apps.path().join("Notes.app")).unwrap();
        fs::create_dir_all(apps.path().join("Utilities")).unwrap();

        let mut registry = Registry::new();
        registry.insert(InstallerSpec::new(
            "Widget Pro",
            URL,
            ArchiveKind::Dmg,
            "Widget.app",
        ));
        let installer = AppInstaller::with_backends(
            registry,
            apps.path(),
            Arc::new(MockFetcher::new()),
            Arc::new(FakeTools::new("/Volumes/none")),
        );

        let names: Vec<_> = installer.installed_names().unwrap().into_iter().collect();
        assert_eq!(names, vec!["Notes", "Widget", "Widget Pro"]);
        assert!(installer.is_installed("Widget Pro"));
        assert!(installer.is_installed("Notes"));
    }

    #[test]
    fn test_missing_applications_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        let installer = AppInstaller::with_backends(
            Registry::new(),
            tmp.path().join("nope"),
            Arc::new(MockFetcher::new()),
            Arc::new(FakeTools::new("/Volumes/none")),
        );
        assert!(installer.installed_names().unwrap().is_empty());
    }

    #[test]
    fn test_describe_resolves_arch() {
        let mut registry = Registry::new();
        registry.insert(InstallerSpec::new(
            "Widget",
            "https://example.com/{arch}/w.dmg",
            ArchiveKind::Dmg,
            "Widget.app",
        ));
        let installer = AppInstaller::with_backends(
            registry,
            "/Applications",
            Arc::new(MockFetcher::new()),
            Arc::new(FakeTools::new("/Volumes/none")),
        )
        .with_arch(Arch::Arm64);

        assert_eq!(
            installer.describe("Widget"),
            "download https://example.com/arm64/w.dmg (dmg) and install Widget.app"
        );
    }
}
