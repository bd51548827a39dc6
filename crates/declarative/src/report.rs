//! Run report: every decision and outcome of one reconciliation run

use crate::types::{Action, Category, Outcome};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// A warning raised during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub category: Category,
    pub message: String,
}

/// A backend tool that could not be made available
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupFailure {
    pub category: Category,
    pub message: String,
}

/// Count of actions per outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    counts: BTreeMap<Outcome, usize>,
}

impl Summary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.counts.get(&outcome).copied().unwrap_or(0)
    }

    /// Total number of actions
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    fn add(&mut self, outcome: Outcome) {
        *self.counts.entry(outcome).or_default() += 1;
    }
}

/// Accumulates actions while a run is in progress
#[derive(Debug)]
pub struct RunRecorder {
    dry_run: bool,
    started_at: DateTime<Local>,
    actions: Vec<Action>,
    warnings: Vec<Warning>,
    setup_failures: Vec<SetupFailure>,
}

impl RunRecorder {
    pub fn new(dry_run: bool) -> Self {
        Self::started_at(dry_run, Local::now())
    }

    /// Create a recorder with an explicit start time
    pub fn started_at(dry_run: bool, started_at: DateTime<Local>) -> Self {
        Self {
            dry_run,
            started_at,
            actions: Vec::new(),
            warnings: Vec::new(),
            setup_failures: Vec::new(),
        }
    }

    pub fn record(&mut self, action: Action) {
        match action.outcome {
            Outcome::Failed => log::warn!(
                "[{}] {} {}: {}",
                action.category,
                action.operation,
                action.identifier,
                action.detail
            ),
            _ => log::info!(
                "[{}] {} {}: {} ({})",
                action.category,
                action.operation,
                action.identifier,
                action.outcome,
                action.detail
            ),
        }
        self.actions.push(action);
    }

    pub fn warn(&mut self, category: Category, message: impl Into<String>) {
        self.warnings.push(Warning {
            category,
            message: message.into(),
        });
    }

    pub fn setup_failure(&mut self, category: Category, message: impl Into<String>) {
        let message = message.into();
        self.warn(category, message.clone());
        self.setup_failures.push(SetupFailure { category, message });
    }

    /// Actions recorded so far
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Close the run. The returned report cannot be changed.
    pub fn finish(self) -> RunReport {
        self.finish_at(Local::now())
    }

    pub fn finish_at(self, finished_at: DateTime<Local>) -> RunReport {
        let mut summary = Summary::default();
        for action in &self.actions {
            summary.add(action.outcome);
        }
        RunReport {
            dry_run: self.dry_run,
            started_at: self.started_at,
            finished_at,
            actions: self.actions,
            warnings: self.warnings,
            setup_failures: self.setup_failures,
            summary,
        }
    }
}

/// The immutable record of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    dry_run: bool,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
    actions: Vec<Action>,
    warnings: Vec<Warning>,
    setup_failures: Vec<SetupFailure>,
    summary: Summary,
}

impl RunReport {
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Local> {
        self.finished_at
    }

    /// Actions in processing order
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn setup_failures(&self) -> &[SetupFailure] {
        &self.setup_failures
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Actions of one category
    pub fn actions_for(&self, category: Category) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.category == category)
    }

    /// Whether a backend tool could not be set up
    pub fn has_setup_failure(&self) -> bool {
        !self.setup_failures.is_empty()
    }

    /// One-line summary, e.g. "3 succeeded, 1 failed, 12 already present"
    pub fn summary_line(&self) -> String {
        let parts: Vec<String> = Outcome::ALL
            .iter()
            .filter(|o| self.summary.count(**o) > 0)
            .map(|o| format!("{} {}", self.summary.count(*o), o.label()))
            .collect();
        if parts.is_empty() {
            "nothing declared".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Plain-text log of the whole run
    pub fn render_log(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { "dry run" } else { "apply" };
        let _ = writeln!(out, "macsetup run ({mode})");
        let _ = writeln!(out, "started:  {}", self.started_at.to_rfc3339());
        let _ = writeln!(out, "finished: {}", self.finished_at.to_rfc3339());
        let _ = writeln!(out);

        let mut current = None;
        for action in &self.actions {
            if current != Some(action.category) {
                current = Some(action.category);
                let _ = writeln!(out, "[{}]", action.category);
            }
            let _ = writeln!(
                out,
                "  {:<24} {:<10} {:<24} {}",
                action.identifier,
                action.operation.to_string(),
                action.outcome.label(),
                action.detail
            );
        }

        if !self.setup_failures.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "setup failures:");
            for failure in &self.setup_failures {
                let _ = writeln!(out, "  [{}] {}", failure.category, failure.message);
            }
        }

        if !self.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "warnings:");
            for warning in &self.warnings {
                let _ = writeln!(out, "  [{}] {}", warning.category, warning.message);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "summary: {}", self.summary_line());
        out
    }
}
