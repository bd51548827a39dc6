//! Error types for application installs.
//!
//! Errors are categorized so the caller can tell a network problem from a
//! broken archive or a failing system tool.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for appkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of install errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network-related errors.
    Network,
    /// The archive is unreadable or lacks the expected bundle.
    Format,
    /// A system tool is missing.
    NotFound,
    /// Permission denied during installation.
    Permission,
    /// A system tool exited with an error.
    Tool,
    /// Other/unknown errors.
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::Format => "Unexpected download contents",
            Self::NotFound => "System tool not found",
            Self::Permission => "Permission denied",
            Self::Tool => "System tool failed",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and run again",
            Self::Format => "The vendor may have changed the download; install it manually",
            Self::NotFound => "This installer only works on macOS",
            Self::Permission => "Check that the applications directory is writable",
            Self::Tool => "Check the tool output above for details",
            Self::Other => "Check the error details for more information",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while installing an application.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {message}")]
    Http {
        /// Error message.
        message: String,
        /// HTTP status code if available.
        status: Option<u16>,
    },

    /// The download finished but the archive has no such bundle.
    #[error("{bundle} not found in {archive}")]
    BundleNotFound {
        /// Expected bundle name.
        bundle: String,
        /// Archive file name.
        archive: String,
    },

    /// A system tool exited with an error.
    #[error("{command} failed: {message}")]
    CommandFailed {
        /// Command that was run.
        command: String,
        /// Exit status or stderr summary.
        message: String,
    },

    /// A required system tool is missing.
    #[error("{0} not found")]
    ToolNotFound(String),

    /// The archive could not be read.
    #[error("cannot read archive: {0}")]
    Archive(String),

    /// Unknown archive format in an installer declaration.
    #[error("unknown installer format '{0}' (expected dmg, pkg or zip)")]
    UnknownFormat(String),

    /// IO error during file operations.
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an HTTP error.
    pub fn http(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Http {
            message: message.into(),
            status,
        }
    }

    /// Create a command failure.
    pub fn command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Http { .. } => ErrorCategory::Network,
            Error::BundleNotFound { .. } | Error::Archive(_) | Error::UnknownFormat(_) => {
                ErrorCategory::Format
            }
            Error::CommandFailed { .. } => ErrorCategory::Tool,
            Error::ToolNotFound(_) => ErrorCategory::NotFound,
            Error::Io { source, .. } => {
                if source.kind() == io::ErrorKind::PermissionDenied {
                    ErrorCategory::Permission
                } else {
                    ErrorCategory::Other
                }
            }
        }
    }
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => Self::Http {
                message: format!("HTTP {code}"),
                status: Some(code),
            },
            other => Self::Http {
                message: other.to_string(),
                status: None,
            },
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}
