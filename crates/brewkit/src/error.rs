//! Error types for Homebrew and mas operations.
//!
//! Errors are categorized from the tools' stderr so callers can give
//! appropriate feedback. Each error type includes contextual information to
//! help users understand what went wrong and how to fix it.

use thiserror::Error;

/// Categories of Homebrew and mas errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors
    Network,
    /// Package not found in any tap
    NotFound,
    /// Version or dependency conflict
    Conflict,
    /// Permission denied
    Permission,
    /// Package is already installed
    AlreadyInstalled,
    /// The tool itself is not installed
    ToolNotFound,
    /// The App Store has no signed-in account
    NotSignedIn,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error can be safely ignored (operation already done).
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::AlreadyInstalled)
    }

    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Package not found",
            Self::Conflict => "Package conflict",
            Self::Permission => "Permission denied",
            Self::AlreadyInstalled => "Already installed",
            Self::ToolNotFound => "Tool not installed",
            Self::NotSignedIn => "Not signed in to the App Store",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and run again",
            Self::NotFound => "Verify the package name or add the required tap",
            Self::Conflict => "Resolve the conflict by removing conflicting packages",
            Self::Permission => "Check directory permissions or run with appropriate access",
            Self::AlreadyInstalled => "No action needed - package is already installed",
            Self::ToolNotFound => "Install Homebrew from https://brew.sh",
            Self::NotSignedIn => "Open the App Store and sign in, then run again",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during Homebrew and mas operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network-related error (connection, timeout, DNS, etc.)
    #[error("network error: {message}")]
    Network {
        /// Detailed error message from the failed network operation
        message: String,
    },

    /// Package not found in any configured tap
    #[error("package not found: {name}")]
    NotFound {
        /// Name of the package that could not be found
        name: String,
    },

    /// Version or dependency conflict
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Permission denied
    #[error("permission denied: {message}")]
    Permission {
        /// Details about what permission was denied
        message: String,
    },

    /// Package is already installed
    #[error("already installed: {name}")]
    AlreadyInstalled {
        /// Name of the already-installed package
        name: String,
    },

    /// Homebrew is not installed or not found in PATH
    #[error("Homebrew not found. Install it from https://brew.sh")]
    BrewNotFound,

    /// mas is not installed or not found in PATH
    #[error("mas not found. Install it with `brew install mas`")]
    MasNotFound,

    /// mas has no signed-in App Store account
    #[error("not signed in to the App Store")]
    NotSignedIn,

    /// Installing a missing tool failed
    #[error("could not install {tool}: {message}")]
    Bootstrap {
        /// Tool being installed
        tool: String,
        /// What went wrong
        message: String,
    },

    /// Command execution failed
    #[error("command failed: {message}")]
    CommandFailed {
        /// Description of what command failed
        message: String,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Network { .. } => ErrorCategory::Network,
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Conflict { .. } => ErrorCategory::Conflict,
            Error::Permission { .. } => ErrorCategory::Permission,
            Error::AlreadyInstalled { .. } => ErrorCategory::AlreadyInstalled,
            Error::BrewNotFound | Error::MasNotFound => ErrorCategory::ToolNotFound,
            Error::NotSignedIn => ErrorCategory::NotSignedIn,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error can be safely ignored.
    pub fn is_ignorable(&self) -> bool {
        self.category().is_ignorable()
    }

    /// Error text with the tool's stderr, for reports
    pub fn detail(&self) -> String {
        match self {
            Error::CommandFailed { message, stderr } if !stderr.is_empty() => {
                format!("{message}: {}", last_line(stderr))
            }
            other => other.to_string(),
        }
    }

    /// Categorize a failed `brew` invocation from its stderr.
    ///
    /// Output is only `AlreadyInstalled` when nothing else in it reports a
    /// failure, so one up-to-date package cannot mask an error in a batch.
    pub fn from_brew_output(stderr: &str, package_name: Option<&str>) -> Self {
        match classify(stderr, BREW_PATTERNS) {
            Some(category) => Self::categorized(category, stderr, package_name),
            None if only_already_installed(stderr) => {
                Self::categorized(ErrorCategory::AlreadyInstalled, stderr, package_name)
            }
            None => Self::command_failed("brew", stderr, package_name),
        }
    }

    /// Categorize a failed `mas` invocation from its output.
    pub fn from_mas_output(output: &str, app_id: Option<&str>) -> Self {
        match classify(output, MAS_PATTERNS) {
            Some(category) => Self::categorized(category, output, app_id),
            None => Self::command_failed("mas", output, app_id),
        }
    }

    fn categorized(category: ErrorCategory, output: &str, subject: Option<&str>) -> Self {
        let message = output.trim().to_string();
        let name = subject.unwrap_or("unknown").to_string();
        match category {
            ErrorCategory::Network => Error::Network { message },
            ErrorCategory::NotFound => Error::NotFound { name },
            ErrorCategory::Conflict => Error::Conflict { message },
            ErrorCategory::Permission => Error::Permission { message },
            ErrorCategory::AlreadyInstalled => Error::AlreadyInstalled { name },
            ErrorCategory::NotSignedIn => Error::NotSignedIn,
            ErrorCategory::ToolNotFound | ErrorCategory::Other => Error::Other(message),
        }
    }

    fn command_failed(tool: &str, output: &str, subject: Option<&str>) -> Self {
        let target = subject.map(|s| format!(" for {s}")).unwrap_or_default();
        Error::CommandFailed {
            message: format!("{tool} command failed{target}"),
            stderr: output.trim().to_string(),
        }
    }
}

/// Lowercase output fragments per category, checked in order.
type Patterns = &'static [(ErrorCategory, &'static [&'static str])];

const BREW_PATTERNS: Patterns = &[
    (
        ErrorCategory::Network,
        &[
            "curl",
            "could not resolve",
            "connection refused",
            "timed out",
            "network",
            "ssl",
            "certificate",
            "failed to download",
            "sha256 mismatch",
        ],
    ),
    (
        ErrorCategory::NotFound,
        &[
            "no available formula",
            "no formulae found",
            "no available cask",
            "no cask with this name",
            "couldn't find",
            "repository not found",
        ],
    ),
    (
        ErrorCategory::Conflict,
        &["conflict", "depends on", "there is already an app at"],
    ),
    (
        ErrorCategory::Permission,
        &[
            "permission denied",
            "operation not permitted",
            "cannot write",
            "sudo",
        ],
    ),
];

const ALREADY_INSTALLED: &[&str] = &[
    "already installed",
    "is already an installed",
    "already tapped",
];

const MAS_PATTERNS: Patterns = &[
    (
        ErrorCategory::NotSignedIn,
        &["not signed in", "sign in", "not logged in"],
    ),
    (ErrorCategory::NotFound, &["no apps found", "no results found"]),
    (ErrorCategory::Network, &["network", "offline"]),
];

fn classify(output: &str, patterns: Patterns) -> Option<ErrorCategory> {
    let lower = output.to_lowercase();
    patterns
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lower.contains(n)))
        .map(|(category, _)| *category)
}

/// Whether every `Error:` line is an already-installed notice and at least
/// one such notice is present.
fn only_already_installed(output: &str) -> bool {
    let mut seen = false;
    for line in output.lines().map(|l| l.trim().to_lowercase()) {
        let notice = ALREADY_INSTALLED.iter().any(|n| line.contains(n));
        if line.starts_with("error:") && !notice {
            return false;
        }
        seen |= notice;
    }
    seen
}

fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map_or("", str::trim)
}

/// Result type for Homebrew operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_ignorable() {
        assert!(ErrorCategory::AlreadyInstalled.is_ignorable());
        assert!(!ErrorCategory::Network.is_ignorable());
        assert!(!ErrorCategory::NotFound.is_ignorable());
    }

    #[test]
    fn test_from_brew_output_network() {
        let err = Error::from_brew_output("curl: (6) Could not resolve host", Some("wget"));
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[test]
    fn test_from_brew_output_not_found() {
        let err = Error::from_brew_output(
            "Error: No available formula with the name \"foo\"",
            Some("foo"),
        );
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_string(), "package not found: foo");
    }

    #[test]
    fn test_from_brew_output_already_installed() {
        let err = Error::from_brew_output("Warning: git is already installed", Some("git"));
        assert_eq!(err.category(), ErrorCategory::AlreadyInstalled);
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_already_installed_does_not_mask_batch_failure() {
        let stderr = "Warning: python@3.13 3.13.1 is already installed and up-to-date.\n\
                      Error: Permission denied @ apply2files - /opt/homebrew/lib/node_modules\n";
        let err = Error::from_brew_output(stderr, Some("python3, jq"));
        assert_eq!(err.category(), ErrorCategory::Permission);
        assert!(!err.is_ignorable());

        let stderr = "Warning: jq 1.7.1 is already installed and up-to-date.\n\
                      Error: fd: something odd happened\n";
        let err = Error::from_brew_output(stderr, Some("jq, fd"));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert!(!err.is_ignorable());
    }

    #[test]
    fn test_already_tapped_error_line_is_ignorable() {
        let err = Error::from_brew_output(
            "Error: Tap hashicorp/tap already tapped.",
            Some("hashicorp/tap"),
        );
        assert!(err.is_ignorable());
    }

    #[test]
    fn test_from_brew_output_permission() {
        let err = Error::from_brew_output("Permission denied @ dir_s_mkdir", Some("foo"));
        assert_eq!(err.category(), ErrorCategory::Permission);
    }

    #[test]
    fn test_from_brew_output_conflict() {
        let err = Error::from_brew_output("Error: foo conflicts with bar", Some("foo"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn test_from_brew_output_unknown_keeps_stderr() {
        let err = Error::from_brew_output("Error: something odd\nexit 1\n", Some("jq"));
        assert_eq!(err.category(), ErrorCategory::Other);
        assert_eq!(err.detail(), "brew command failed for jq: exit 1");
    }

    #[test]
    fn test_from_mas_output_not_signed_in() {
        let err = Error::from_mas_output("Error: Not signed in", Some("409183694"));
        assert_eq!(err.category(), ErrorCategory::NotSignedIn);
    }

    #[test]
    fn test_from_mas_output_not_found() {
        let err = Error::from_mas_output("Error: No apps found in the Mac App Store", Some("1"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_tool_not_found_category() {
        assert_eq!(Error::BrewNotFound.category(), ErrorCategory::ToolNotFound);
        assert_eq!(Error::MasNotFound.category(), ErrorCategory::ToolNotFound);
    }
}
