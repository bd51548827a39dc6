//! Registry of known application installers, keyed by name.
//!
//! Names are matched verbatim. A name with no entry has no automated
//! installer and must be installed by hand.

use crate::types::{ArchiveKind, InstallerSpec};
use std::collections::BTreeMap;

/// Installers shipped with the tool: (name, url, format, bundle).
const BUILTIN: &[(&str, &str, ArchiveKind, &str)] = &[
    (
        "Google Chrome",
        "https://dl.google.com/chrome/mac/universal/stable/GGRO/googlechrome.dmg",
        ArchiveKind::Dmg,
        "Google Chrome.app",
    ),
    (
        "Firefox",
        "https://download.mozilla.org/?product=firefox-latest-ssl&os=osx&lang=en-US",
        ArchiveKind::Dmg,
        "Firefox.app",
    ),
    (
        "Slack",
        "https://slack.com/ssb/download-osx-universal",
        ArchiveKind::Dmg,
        "Slack.app",
    ),
    (
        "Visual Studio Code",
        "https://update.code.visualstudio.com/latest/darwin-universal/stable",
        ArchiveKind::Zip,
        "Visual Studio Code.app",
    ),
    (
        "Zoom",
        "https://zoom.us/client/latest/Zoom.pkg",
        ArchiveKind::Pkg,
        "zoom.us.app",
    ),
];

/// Name-to-installer mapping.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<String, InstallerSpec>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in installers.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (name, url, kind, bundle) in BUILTIN {
            registry.insert(InstallerSpec::new(*name, *url, *kind, *bundle));
        }
        registry
    }

    /// Add or replace an installer.
    pub fn insert(&mut self, spec: InstallerSpec) {
        if self.entries.contains_key(&spec.name) {
            log::debug!("Overriding installer for {}", spec.name);
        }
        self.entries.insert(spec.name.clone(), spec);
    }

    /// Installer for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&InstallerSpec> {
        self.entries.get(name)
    }

    /// Bundle that marks `name` as installed.
    ///
    /// Unmapped names are expected at `<name>.app`.
    #[must_use]
    pub fn bundle_for(&self, name: &str) -> String {
        self.get(name)
            .map_or_else(|| format!("{name}.app"), |spec| spec.bundle.clone())
    }

    /// All installers, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &InstallerSpec> {
        self.entries.values()
    }

    /// Number of installers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
