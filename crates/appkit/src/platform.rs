//! CPU architecture detection for vendor downloads.
//!
//! # Example
//!
//! ```
//! use appkit::platform::Arch;
//!
//! let arch = Arch::detect();
//! println!("Downloading for: {arch}");
//! ```

use std::fmt;

/// CPU architecture as vendors name it in download URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// Apple Silicon
    Arm64,
    /// Intel
    X86_64,
}

impl Arch {
    /// Detect the current architecture.
    ///
    /// Anything that is not ARM64 is treated as Intel.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_target(std::env::consts::ARCH)
    }

    /// Map a Rust target architecture name.
    #[must_use]
    pub fn from_target(arch: &str) -> Self {
        match arch {
            "aarch64" | "arm64" => Self::Arm64,
            _ => Self::X86_64,
        }
    }

    /// Name substituted for `{arch}`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_target() {
        assert_eq!(Arch::from_target("aarch64"), Arch::Arm64);
        assert_eq!(Arch::from_target("x86_64"), Arch::X86_64);
    }

    #[test]
    fn test_detect_matches_target() {
        let arch = Arch::detect();
        if cfg!(target_arch = "aarch64") {
            assert_eq!(arch, Arch::Arm64);
        } else {
            assert_eq!(arch, Arch::X86_64);
        }
    }
}
