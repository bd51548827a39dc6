//! Loading the desired-state document
//!
//! `desired.json` (or `desired.toml`) lives in the config directory. On a
//! first run without one, the installed-state snapshot `installed.json`
//! from the same directory is copied to `desired.json` and used as is.

use anyhow::{Context, Result, bail};
use appkit::{ArchiveKind, InstallerSpec, Registry};
use declarative::StateDocument;
use std::fs;
use std::path::{Path, PathBuf};

pub const DESIRED_JSON: &str = "desired.json";
pub const DESIRED_TOML: &str = "desired.toml";
pub const SNAPSHOT_JSON: &str = "installed.json";

/// A loaded desired-state document and where it came from
#[derive(Debug)]
pub struct Desired {
    pub document: StateDocument,
    pub path: PathBuf,
    /// Copied from the snapshot on this run
    pub bootstrapped: bool,
}

/// Path of the installed-state snapshot
pub fn snapshot_path(config_dir: &Path) -> PathBuf {
    config_dir.join(SNAPSHOT_JSON)
}

/// Load and validate the desired-state document
pub fn load_desired(config_dir: &Path) -> Result<Desired> {
    let json = config_dir.join(DESIRED_JSON);
    if json.exists() {
        let document = StateDocument::load(&json)?;
        return Ok(Desired {
            document,
            path: json,
            bootstrapped: false,
        });
    }

    let toml_path = config_dir.join(DESIRED_TOML);
    if toml_path.exists() {
        let document = load_toml(&toml_path)?;
        return Ok(Desired {
            document,
            path: toml_path,
            bootstrapped: false,
        });
    }

    let snapshot = snapshot_path(config_dir);
    if !snapshot.exists() {
        bail!(
            "No {} in {}. Generate {} with the audit tool first.",
            DESIRED_JSON,
            config_dir.display(),
            SNAPSHOT_JSON
        );
    }

    // Validate before copying so a broken snapshot never becomes desired.json
    let document = StateDocument::load(&snapshot)?;
    fs::copy(&snapshot, &json).with_context(|| {
        format!(
            "Could not copy {} to {}",
            snapshot.display(),
            json.display()
        )
    })?;
    log::info!("Bootstrapped {} from {}", json.display(), snapshot.display());

    Ok(Desired {
        document,
        path: json,
        bootstrapped: true,
    })
}

fn load_toml(path: &Path) -> Result<StateDocument> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))?;
    let document: StateDocument = toml::from_str(&content)
        .with_context(|| format!("Invalid document {}", path.display()))?;
    document
        .validate()
        .with_context(|| format!("Invalid document {}", path.display()))?;
    Ok(document)
}

/// Built-in installers plus the ones declared in the document
pub fn registry(document: &StateDocument) -> Result<Registry> {
    let mut registry = Registry::builtin();
    for (name, decl) in &document.installers {
        let kind: ArchiveKind = decl
            .format
            .parse()
            .with_context(|| format!("Invalid installer '{name}'"))?;
        registry.insert(InstallerSpec::new(name, &decl.url, kind, &decl.bundle));
    }
    Ok(registry)
}
