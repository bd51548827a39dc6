//! Desired-state and installed-state documents
//!
//! Both documents share one shape. The desired document is written by a
//! human (usually starting from a snapshot); the installed snapshot is
//! produced by probing the host.

use crate::types::Category;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A Mac App Store app. `id` is the lookup key, `name` is for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreApp {
    pub id: String,
    pub name: String,
}

/// An application installed from a vendor download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectDownload {
    pub name: String,
}

/// Global git identity. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitIdentity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl GitIdentity {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// A custom direct-download installer declared alongside the packages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallerDecl {
    /// Download URL, may contain `{arch}`
    pub url: String,
    /// Archive format: `dmg`, `pkg` or `zip`
    pub format: String,
    /// Bundle expected inside the archive (e.g. `Foo.app`)
    pub bundle: String,
}

/// The shared desired/installed document shape
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateDocument {
    #[serde(default)]
    pub taps: Vec<String>,
    #[serde(default)]
    pub formulae: Vec<String>,
    #[serde(default)]
    pub casks: Vec<String>,
    #[serde(default)]
    pub store_apps: Vec<StoreApp>,
    #[serde(default)]
    pub direct_downloads: Vec<DirectDownload>,
    #[serde(default, skip_serializing_if = "GitIdentity::is_empty")]
    pub git_identity: GitIdentity,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub installers: BTreeMap<String, InstallerDecl>,
}

/// Errors raised while loading or validating a document
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The file could not be read or written
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid document
    #[error("invalid document {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The same identifier appears twice in a category
    #[error("duplicate entry '{identifier}' in {category}")]
    Duplicate {
        category: Category,
        identifier: String,
    },

    /// An identifier is empty or only whitespace
    #[error("empty identifier in {category}")]
    EmptyIdentifier { category: Category },
}

impl StateDocument {
    /// Parse a JSON document and validate it
    pub fn from_json(content: &str, origin: &str) -> Result<Self, DocumentError> {
        let doc: Self = serde_json::from_str(content).map_err(|source| DocumentError::Parse {
            path: origin.to_string(),
            source,
        })?;
        doc.validate()?;
        Ok(doc)
    }

    /// Load and validate a JSON document from disk
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content, &path.display().to_string())
    }

    /// Write the document as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let io_err = |source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut content = serde_json::to_string_pretty(self).map_err(|source| {
            DocumentError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;
        content.push('\n');
        fs::write(path, content).map_err(io_err)
    }

    /// Check identifier uniqueness and non-emptiness per category
    pub fn validate(&self) -> Result<(), DocumentError> {
        for category in Category::ORDER {
            let ids = self.identifiers(category);
            let mut seen = HashSet::new();
            for id in ids {
                if id.trim().is_empty() {
                    return Err(DocumentError::EmptyIdentifier { category });
                }
                if !seen.insert(id) {
                    return Err(DocumentError::Duplicate {
                        category,
                        identifier: id.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Identifiers of a category in document order
    ///
    /// For the identity category these are the git config keys that have a
    /// desired value.
    pub fn identifiers(&self, category: Category) -> Vec<&str> {
        match category {
            Category::Taps => self.taps.iter().map(String::as_str).collect(),
            Category::Formulae => self.formulae.iter().map(String::as_str).collect(),
            Category::Casks => self.casks.iter().map(String::as_str).collect(),
            Category::StoreApps => self.store_apps.iter().map(|a| a.id.as_str()).collect(),
            Category::DirectDownloads => self
                .direct_downloads
                .iter()
                .map(|d| d.name.as_str())
                .collect(),
            Category::Identity => IdentityField::ALL
                .iter()
                .filter(|f| self.git_identity.get(**f).is_some())
                .map(|f| f.key())
                .collect(),
        }
    }

    /// Total number of declared items across all categories
    pub fn len(&self) -> usize {
        Category::ORDER
            .iter()
            .map(|c| self.identifiers(*c).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A field of the git identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityField {
    Name,
    Email,
}

impl IdentityField {
    pub const ALL: [IdentityField; 2] = [IdentityField::Name, IdentityField::Email];

    /// git config key
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "user.name",
            Self::Email => "user.email",
        }
    }
}

impl GitIdentity {
    pub fn get(&self, field: IdentityField) -> Option<&str> {
        match field {
            IdentityField::Name => self.name.as_deref(),
            IdentityField::Email => self.email.as_deref(),
        }
    }

    pub fn set(&mut self, field: IdentityField, value: Option<String>) {
        match field {
            IdentityField::Name => self.name = value,
            IdentityField::Email => self.email = value,
        }
    }
}
