//! Install macOS applications from vendor downloads.
//!
//! Applications that are neither formulae, casks nor App Store apps are
//! fetched straight from their vendor. A [`Registry`] maps a name such as
//! `"Google Chrome"` to an [`InstallerSpec`]: a URL, the archive format and
//! the `.app` bundle the archive contains. [`AppInstaller`] downloads the
//! archive into a scratch directory, then:
//!
//! - `dmg`: mounts the image, copies the bundle (or runs the package found
//!   on the volume) and unmounts it
//! - `pkg`: runs `installer`
//! - `zip`: extracts the archive and copies the bundle
//!
//! # Example
//!
//! ```no_run
//! use appkit::{AppInstaller, InstallOutcome, Registry};
//!
//! let installer = AppInstaller::new(Registry::builtin(), "/Applications");
//! if !installer.is_installed("Firefox") {
//!     match installer.install("Firefox")? {
//!         InstallOutcome::Installed(path) => println!("installed {}", path.display()),
//!         InstallOutcome::NoInstaller => println!("install Firefox by hand"),
//!     }
//! }
//! # Ok::<(), appkit::Error>(())
//! ```

#![warn(missing_docs)]

pub mod bundle;
pub mod error;
pub mod fetch;
pub mod installer;
pub mod platform;
pub mod registry;
pub mod system;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use fetch::{Fetcher, HttpFetcher, MockFetcher};
pub use installer::AppInstaller;
pub use platform::Arch;
pub use registry::Registry;
pub use system::{MacTools, SystemTools};
pub use types::{ArchiveKind, InstallOutcome, InstallerSpec};
