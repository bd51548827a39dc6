//! Core types for Homebrew package management.

use serde::{Deserialize, Serialize};

/// Type of Homebrew package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// Homebrew tap (third-party repository)
    Tap,
    /// Homebrew formula (CLI tool)
    Formula,
    /// Homebrew cask (GUI application)
    Cask,
}

impl PackageType {
    /// Name used in brew commands and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::Tap => "tap",
            PackageType::Formula => "formula",
            PackageType::Cask => "cask",
        }
    }

    /// Arguments that install packages of this type.
    ///
    /// Taps take a single name per call; formulae and casks accept many.
    pub fn install_args(&self) -> &'static [&'static str] {
        match self {
            PackageType::Tap => &["tap"],
            PackageType::Formula => &["install", "--formula"],
            PackageType::Cask => &["install", "--cask"],
        }
    }

    /// Whether one `brew` call can install several packages of this type.
    pub fn is_batchable(&self) -> bool {
        !matches!(self, PackageType::Tap)
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Information about an installed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledPackage {
    /// Package name (tap name, formula name or cask token)
    pub name: String,
    /// Tap-qualified name, e.g. `hashicorp/tap/terraform`; equal to `name`
    /// for core packages and taps
    #[serde(default)]
    pub full_name: String,
    /// Package type
    pub package_type: PackageType,
    /// Installed version, empty for taps
    pub version: String,
}

impl InstalledPackage {
    /// Create an installed package record.
    pub fn new(
        name: impl Into<String>,
        package_type: PackageType,
        version: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            full_name: name.clone(),
            name,
            package_type,
            version: version.into(),
        }
    }

    /// Set the tap-qualified name.
    #[must_use]
    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    /// Names this package answers to: the short name and, when different,
    /// the tap-qualified one.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain((self.full_name != self.name).then_some(self.full_name.as_str()))
    }
}

/// An app installed from the Mac App Store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasApp {
    /// Numeric App Store identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Installed version
    pub version: String,
}
