//! Adapters connecting the reconciler to real backends
//!
//! - [`homebrew`] - taps, formulae and casks through `brew`
//! - [`app_store`] - App Store apps through `mas`
//! - [`direct`] - vendor downloads through `appkit`
//! - [`git_identity`] - `git config --global user.*`

pub mod app_store;
pub mod direct;
pub mod git_identity;
pub mod homebrew;

pub use app_store::AppStore;
pub use direct::DirectDownloads;
pub use git_identity::GitConfig;
pub use homebrew::Homebrew;

use declarative::InstallError;

/// Convert a brew or mas failure into an adapter error
pub fn from_brew_error(error: brewkit::Error) -> InstallError {
    match error {
        brewkit::Error::NotSignedIn => InstallError::Unauthenticated {
            backend: "App Store".to_string(),
        },
        brewkit::Error::BrewNotFound => InstallError::ToolMissing {
            tool: "brew".to_string(),
        },
        brewkit::Error::MasNotFound => InstallError::ToolMissing {
            tool: "mas".to_string(),
        },
        brewkit::Error::Bootstrap { tool, message } => InstallError::Bootstrap { tool, message },
        other => {
            let message = other.detail();
            log::debug!("{} ({})", message, other.category().description());
            InstallError::failed(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_brew_error() {
        assert!(matches!(
            from_brew_error(brewkit::Error::NotSignedIn),
            InstallError::Unauthenticated { .. }
        ));
        assert_eq!(
            from_brew_error(brewkit::Error::MasNotFound),
            InstallError::ToolMissing {
                tool: "mas".to_string()
            }
        );
        assert_eq!(
            from_brew_error(brewkit::Error::NotFound {
                name: "nope".to_string()
            }),
            InstallError::failed("package not found: nope")
        );
    }

    #[test]
    fn test_command_failure_keeps_stderr() {
        let err = from_brew_error(brewkit::Error::CommandFailed {
            message: "brew install failed".to_string(),
            stderr: "Downloading...\nError: checksum mismatch\n".to_string(),
        });
        assert_eq!(
            err,
            InstallError::failed("brew install failed: Error: checksum mismatch")
        );
    }
}
