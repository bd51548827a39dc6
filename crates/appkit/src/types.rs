//! Core types for application installers.

use crate::error::Error;
use crate::platform::Arch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Format of a vendor download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    /// Disk image, mounted with `hdiutil`
    Dmg,
    /// Installer package, handed to `installer`
    Pkg,
    /// Zip archive holding the bundle
    Zip,
}

impl ArchiveKind {
    /// File extension for downloaded archives.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Dmg => "dmg",
            Self::Pkg => "pkg",
            Self::Zip => "zip",
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dmg" => Ok(Self::Dmg),
            "pkg" => Ok(Self::Pkg),
            "zip" => Ok(Self::Zip),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// How to install one application.
///
/// `bundle` is the application bundle that ends up in the applications
/// directory. Its presence is what makes the application installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerSpec {
    /// Name used in documents (e.g. "Google Chrome")
    pub name: String,
    /// Download URL, may contain `{arch}`
    pub url: String,
    /// Archive format
    pub kind: ArchiveKind,
    /// Bundle installed into the applications directory (e.g. "Google Chrome.app")
    pub bundle: String,
}

impl InstallerSpec {
    /// Create an installer spec.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        kind: ArchiveKind,
        bundle: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            kind,
            bundle: bundle.into(),
        }
    }

    /// URL with `{arch}` substituted.
    #[must_use]
    pub fn resolved_url(&self, arch: Arch) -> String {
        self.url.replace("{arch}", arch.as_str())
    }

    /// File name for the downloaded archive.
    #[must_use]
    pub fn archive_name(&self) -> String {
        let stem: String = self
            .name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("{}.{}", stem, self.kind.extension())
    }

    /// Where the bundle lives once installed.
    #[must_use]
    pub fn installed_path(&self, applications_dir: &Path) -> PathBuf {
        applications_dir.join(&self.bundle)
    }
}

/// Result of installing one application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The bundle is in place
    Installed(PathBuf),
    /// No installer is known for the name
    NoInstaller,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_kind_from_str() {
        assert_eq!("dmg".parse::<ArchiveKind>().unwrap(), ArchiveKind::Dmg);
        assert_eq!(" PKG ".parse::<ArchiveKind>().unwrap(), ArchiveKind::Pkg);
        assert_eq!("zip".parse::<ArchiveKind>().unwrap(), ArchiveKind::Zip);
        assert!(matches!(
            "tar".parse::<ArchiveKind>(),
            Err(Error::UnknownFormat(f)) if f == "tar"
        ));
    }

    #[test]
    fn test_resolved_url_substitutes_arch() {
        let spec = InstallerSpec::new(
            "Widget",
            "https://example.com/{arch}/Widget.dmg",
            ArchiveKind::Dmg,
            "Widget.app",
        );
        assert_eq!(
            spec.resolved_url(Arch::Arm64),
            "https://example.com/arm64/Widget.dmg"
        );
        assert_eq!(
            spec.resolved_url(Arch::X86_64),
            "https://example.com/x86_64/Widget.dmg"
        );
    }

    #[test]
    fn test_archive_name_is_file_safe() {
        let spec = InstallerSpec::new("Google Chrome", "u", ArchiveKind::Dmg, "Google Chrome.app");
        assert_eq!(spec.archive_name(), "Google-Chrome.dmg");
    }

    #[test]
    fn test_installed_path() {
        let spec = InstallerSpec::new("Zoom", "u", ArchiveKind::Pkg, "zoom.us.app");
        assert_eq!(
            spec.installed_path(Path::new("/Applications")),
            PathBuf::from("/Applications/zoom.us.app")
        );
    }
}
