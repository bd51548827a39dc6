//! Set difference between desired and installed identifiers

use std::collections::BTreeSet;

/// Desired identifiers of one category split by presence on the host
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDiff<'a> {
    /// Desired and already installed, in document order
    pub present: Vec<&'a str>,
    /// Desired but not installed, in document order
    pub missing: Vec<&'a str>,
}

impl<'a> CategoryDiff<'a> {
    /// Compute `desired − installed`, keeping the desired order
    ///
    /// Identifiers are compared verbatim. Installed identifiers that are
    /// not desired are ignored; nothing is ever removed.
    pub fn compute(desired: &[&'a str], installed: &BTreeSet<String>) -> Self {
        let (present, missing) = desired
            .iter()
            .copied()
            .partition(|id| installed.contains(*id));
        Self { present, missing }
    }

    pub fn is_converged(&self) -> bool {
        self.missing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_missing_is_exact_difference() {
        let diff = CategoryDiff::compute(&["git", "jq"], &set(&["git"]));
        assert_eq!(diff.present, vec!["git"]);
        assert_eq!(diff.missing, vec!["jq"]);
    }

    #[test]
    fn test_extra_installed_is_ignored() {
        let diff = CategoryDiff::compute(&["git"], &set(&["git", "wget", "curl"]));
        assert_eq!(diff.present, vec!["git"]);
        assert!(diff.missing.is_empty());
        assert!(diff.is_converged());
    }

    #[test]
    fn test_document_order_is_kept() {
        let diff = CategoryDiff::compute(&["zsh", "bat", "atuin"], &set(&[]));
        assert_eq!(diff.missing, vec!["zsh", "bat", "atuin"]);
    }

    #[test]
    fn test_comparison_is_verbatim() {
        let diff = CategoryDiff::compute(&["Git", "jq "], &set(&["git", "jq"]));
        assert_eq!(diff.missing, vec!["Git", "jq "]);
    }
}
