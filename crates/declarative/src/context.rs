//! Progress callbacks
//!
//! These let a front end show what the reconciler is doing without the
//! declarative crate depending on any terminal library.

use crate::types::{Action, Category};

/// Progress callback for reconciliation
///
/// Implement this trait to receive progress updates during a run.
pub trait ProgressCallback {
    /// Called when a category starts, with the number of declared items
    fn on_category_start(&mut self, category: Category, declared: usize);

    /// Called before an adapter call that may take a while
    fn on_install_start(&mut self, category: Category, identifiers: &[&str]);

    /// Called when an action has been recorded
    fn on_action(&mut self, action: &Action);

    /// Called when a warning has been recorded
    fn on_warning(&mut self, category: Category, message: &str);

    /// Called when a category is done
    fn on_category_complete(&mut self, category: Category);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_category_start(&mut self, _category: Category, _declared: usize) {}
    fn on_install_start(&mut self, _category: Category, _identifiers: &[&str]) {}
    fn on_action(&mut self, _action: &Action) {}
    fn on_warning(&mut self, _category: Category, _message: &str) {}
    fn on_category_complete(&mut self, _category: Category) {}
}
