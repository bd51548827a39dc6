//! Terminal progress for reconciliation runs.

use crate::ui;
use declarative::{Action, Category, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Prints each category and action, with a spinner while installs run
#[derive(Default)]
pub struct TerminalProgress {
    spinner: Option<ProgressBar>,
}

impl TerminalProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

impl ProgressCallback for TerminalProgress {
    fn on_category_start(&mut self, category: Category, declared: usize) {
        ui::section(&format!("{} ({declared})", category.title()));
    }

    fn on_install_start(&mut self, _category: Category, identifiers: &[&str]) {
        self.clear_spinner();
        self.spinner = Some(spinner(format!("Installing {}", identifiers.join(", "))));
    }

    fn on_action(&mut self, action: &Action) {
        self.clear_spinner();
        ui::action(action);
    }

    fn on_warning(&mut self, _category: Category, message: &str) {
        self.clear_spinner();
        ui::warn(message);
    }

    fn on_category_complete(&mut self, _category: Category) {
        self.clear_spinner();
    }
}

impl Drop for TerminalProgress {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}
