//! # Declarative
//!
//! Desired-state reconciliation for a workstation.
//!
//! A [`StateDocument`] lists what should be installed. The [`Reconciler`]
//! probes each category through an [`Adapter`], computes what is missing,
//! installs it, and returns a [`RunReport`] describing every decision.
//!
//! ## Core Concepts
//!
//! - **Category**: taps, formulae, casks, store apps, direct downloads and
//!   the git identity, always processed in [`Category::ORDER`]
//! - **Adapter**: a backend that lists and installs identifiers
//! - **Action**: one recorded decision with its [`Outcome`]
//! - **RunReport**: the immutable record of a run
//!
//! Reconciliation is additive. Installed items that are not declared are
//! never removed, and a dry run has no side effects at all.
//!
//! ## Example
//!
//! ```
//! use declarative::mock::{MockAdapter, MockIdentity};
//! use declarative::{
//!     Backends, Category, NoProgress, Outcome, ReconcileOptions, Reconciler, StateDocument,
//! };
//!
//! let packages = MockAdapter::new("homebrew").with_installed(Category::Formulae, &["git"]);
//! let store = MockAdapter::new("mas");
//! let downloads = MockAdapter::new("direct");
//! let identity = MockIdentity::default();
//! let backends = Backends {
//!     packages: &packages,
//!     store: &store,
//!     downloads: &downloads,
//!     identity: &identity,
//! };
//!
//! let desired = StateDocument::from_json(r#"{"formulae": ["git", "jq"]}"#, "inline").unwrap();
//! let report = Reconciler::new(&backends, ReconcileOptions::default())
//!     .run(&desired, &mut NoProgress);
//!
//! assert_eq!(report.summary().count(Outcome::Succeeded), 1);
//! assert_eq!(report.summary().count(Outcome::SkippedAlreadyPresent), 1);
//! ```
//!
//! ## Provider Traits
//!
//! - [`Adapter`]: lists and installs identifiers of some categories
//! - [`IdentityStore`]: reads and writes the global git identity
//! - [`ProgressCallback`]: receives progress updates
//!
//! This keeps the crate free of process spawning and terminal output.

pub mod adapter;
pub mod context;
pub mod diff;
pub mod document;
pub mod mock;
pub mod prober;
pub mod reconciler;
pub mod report;
pub mod types;

// Re-export main types at crate root
pub use adapter::{Adapter, IdentityStore, InstallError, Installed};
pub use context::{NoProgress, ProgressCallback};
pub use diff::CategoryDiff;
pub use document::{
    DirectDownload, DocumentError, GitIdentity, IdentityField, InstallerDecl, StateDocument,
    StoreApp,
};
pub use prober::{Backends, Probe, Prober};
pub use reconciler::Reconciler;
pub use report::{RunRecorder, RunReport, SetupFailure, Summary, Warning};
pub use types::{Action, Category, Operation, Outcome, ReconcileOptions};
