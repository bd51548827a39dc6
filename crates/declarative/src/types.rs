//! Core types for desired-state reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;

/// A category of installable things, processed in a fixed order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Third-party Homebrew repositories
    Taps,
    /// Homebrew formulae (CLI tools)
    Formulae,
    /// Homebrew casks (GUI applications)
    Casks,
    /// Mac App Store apps
    StoreApps,
    /// Applications installed from vendor downloads
    DirectDownloads,
    /// Global git identity
    Identity,
}

impl Category {
    /// Processing order. Later categories may rely on tools installed by
    /// earlier ones (e.g. `mas` is a formula).
    pub const ORDER: [Category; 6] = [
        Category::Taps,
        Category::Formulae,
        Category::Casks,
        Category::StoreApps,
        Category::DirectDownloads,
        Category::Identity,
    ];

    /// Key used in documents and logs
    pub fn key(&self) -> &'static str {
        match self {
            Self::Taps => "taps",
            Self::Formulae => "formulae",
            Self::Casks => "casks",
            Self::StoreApps => "store_apps",
            Self::DirectDownloads => "direct_downloads",
            Self::Identity => "git_identity",
        }
    }

    /// Human-readable title
    pub fn title(&self) -> &'static str {
        match self {
            Self::Taps => "Homebrew taps",
            Self::Formulae => "Homebrew formulae",
            Self::Casks => "Homebrew casks",
            Self::StoreApps => "App Store apps",
            Self::DirectDownloads => "Direct downloads",
            Self::Identity => "Git identity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// What an action does to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Install a package or application
    Install,
    /// Set a configuration value
    Configure,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Install => f.write_str("install"),
            Self::Configure => f.write_str("configure"),
        }
    }
}

/// Outcome of a single reconciliation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Would be applied (dry run)
    Pending,
    /// Already present, nothing to do
    SkippedAlreadyPresent,
    /// Applied successfully
    Succeeded,
    /// Apply failed
    Failed,
    /// No automated installer exists; the operator has to install it
    ManualRequired,
}

impl Outcome {
    /// All outcomes in summary order
    pub const ALL: [Outcome; 5] = [
        Outcome::Succeeded,
        Outcome::Failed,
        Outcome::ManualRequired,
        Outcome::Pending,
        Outcome::SkippedAlreadyPresent,
    ];

    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SkippedAlreadyPresent => "already present",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::ManualRequired => "manual install required",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One recorded reconciliation step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub category: Category,
    pub identifier: String,
    pub operation: Operation,
    pub outcome: Outcome,
    pub detail: String,
}

impl Action {
    /// Create an install action
    pub fn install(
        category: Category,
        identifier: impl Into<String>,
        outcome: Outcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            category,
            identifier: identifier.into(),
            operation: Operation::Install,
            outcome,
            detail: detail.into(),
        }
    }

    /// Create a configure action
    pub fn configure(
        category: Category,
        identifier: impl Into<String>,
        outcome: Outcome,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            category,
            identifier: identifier.into(),
            operation: Operation::Configure,
            outcome,
            detail: detail.into(),
        }
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Compute and report actions without applying any of them
    pub dry_run: bool,
}
