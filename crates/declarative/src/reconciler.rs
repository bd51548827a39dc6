//! The reconciliation loop
//!
//! For each category, in [`Category::ORDER`]:
//! 1. Probe what is installed
//! 2. Diff it against the desired identifiers
//! 3. Record already-present identifiers as skipped
//! 4. Install the rest (or record them as pending in a dry run)
//!
//! A failing category never stops the categories after it. Nothing is
//! retried; running again is the retry, and it is safe because present
//! identifiers are skipped.

use crate::adapter::{Adapter, InstallError, Installed};
use crate::context::ProgressCallback;
use crate::diff::CategoryDiff;
use crate::document::{IdentityField, StateDocument};
use crate::prober::{Backends, Prober};
use crate::report::{RunRecorder, RunReport};
use crate::types::{Action, Category, Outcome, ReconcileOptions};

/// Reconciles a desired-state document against the host
pub struct Reconciler<'a> {
    backends: &'a Backends<'a>,
    options: ReconcileOptions,
}

/// Recorder plus progress sink for one run
struct Session<'p, P: ProgressCallback> {
    recorder: RunRecorder,
    progress: &'p mut P,
}

impl<P: ProgressCallback> Session<'_, P> {
    fn record(&mut self, action: Action) {
        self.progress.on_action(&action);
        self.recorder.record(action);
    }

    fn warn(&mut self, category: Category, message: String) {
        self.progress.on_warning(category, &message);
        self.recorder.warn(category, message);
    }

    fn setup_failure(&mut self, category: Category, message: String) {
        self.progress.on_warning(category, &message);
        self.recorder.setup_failure(category, message);
    }
}

impl<'a> Reconciler<'a> {
    pub fn new(backends: &'a Backends<'a>, options: ReconcileOptions) -> Self {
        Self { backends, options }
    }

    /// Run one reconciliation and return its report
    pub fn run<P: ProgressCallback>(&self, desired: &StateDocument, progress: &mut P) -> RunReport {
        let mut session = Session {
            recorder: RunRecorder::new(self.options.dry_run),
            progress,
        };
        let prober = Prober::new(self.backends);

        for category in Category::ORDER {
            let ids = desired.identifiers(category);
            if ids.is_empty() {
                log::debug!("{category}: nothing declared");
                continue;
            }

            session.progress.on_category_start(category, ids.len());
            match self.backends.adapter_for(category) {
                Some(adapter) => {
                    self.reconcile_packages(&mut session, &prober, adapter, category, &ids);
                }
                None => self.reconcile_identity(&mut session, &prober, desired),
            }
            session.progress.on_category_complete(category);
        }

        session.recorder.finish()
    }

    fn reconcile_packages<P: ProgressCallback>(
        &self,
        session: &mut Session<'_, P>,
        prober: &Prober<'_>,
        adapter: &dyn Adapter,
        category: Category,
        ids: &[&str],
    ) {
        let probe = prober.probe(category);
        if let Some(warning) = probe.warning() {
            session.warn(category, warning.to_string());
        }
        let Some(installed) = probe.installed() else {
            return;
        };

        let diff = CategoryDiff::compute(ids, installed);
        for id in &diff.present {
            session.record(Action::install(
                category,
                *id,
                Outcome::SkippedAlreadyPresent,
                "already installed",
            ));
        }
        if diff.is_converged() {
            return;
        }

        if self.options.dry_run {
            self.record_pending(session, adapter, category, &diff.missing);
            return;
        }

        if let Err(e) = adapter.ensure_available(category) {
            session.setup_failure(category, format!("{}: {e}", category.title()));
            for id in &diff.missing {
                session.record(Action::install(category, *id, Outcome::Failed, e.to_string()));
            }
            return;
        }

        if adapter.supports_batch(category) {
            self.install_batch(session, adapter, category, &diff.missing);
        } else {
            for id in &diff.missing {
                if !self.install_one(session, adapter, category, id) {
                    break;
                }
            }
        }
    }

    fn record_pending<P: ProgressCallback>(
        &self,
        session: &mut Session<'_, P>,
        adapter: &dyn Adapter,
        category: Category,
        missing: &[&str],
    ) {
        if adapter.supports_batch(category) {
            let command = adapter.describe_install(category, missing);
            for id in missing {
                session.record(Action::install(
                    category,
                    *id,
                    Outcome::Pending,
                    format!("would run: {command}"),
                ));
            }
        } else {
            for id in missing {
                let command = adapter.describe_install(category, &[*id]);
                session.record(Action::install(
                    category,
                    *id,
                    Outcome::Pending,
                    format!("would run: {command}"),
                ));
            }
        }
    }

    /// Install a single identifier. Returns `false` when the rest of the
    /// category should be skipped.
    fn install_one<P: ProgressCallback>(
        &self,
        session: &mut Session<'_, P>,
        adapter: &dyn Adapter,
        category: Category,
        id: &str,
    ) -> bool {
        session.progress.on_install_start(category, &[id]);
        match adapter.install(category, id) {
            Ok(Installed::Done) => {
                session.record(Action::install(category, id, Outcome::Succeeded, "installed"));
            }
            Ok(Installed::ManualRequired { reason }) => {
                session.record(Action::install(
                    category,
                    id,
                    Outcome::ManualRequired,
                    reason,
                ));
            }
            Err(e @ InstallError::Unauthenticated { .. }) => {
                session.warn(category, format!("{}: {e}, skipping", category.title()));
                return false;
            }
            Err(e) => {
                session.record(Action::install(category, id, Outcome::Failed, e.to_string()));
            }
        }
        true
    }

    fn install_batch<P: ProgressCallback>(
        &self,
        session: &mut Session<'_, P>,
        adapter: &dyn Adapter,
        category: Category,
        missing: &[&str],
    ) {
        session.progress.on_install_start(category, missing);
        let error = match adapter.install_batch(category, missing) {
            Ok(()) => {
                for id in missing {
                    session.record(Action::install(category, *id, Outcome::Succeeded, "installed"));
                }
                return;
            }
            Err(e @ InstallError::Unauthenticated { .. }) => {
                session.warn(category, format!("{}: {e}, skipping", category.title()));
                return;
            }
            Err(e) => e,
        };

        // The batch is not transactional: find out which ones made it.
        match adapter.list_installed(category) {
            Ok(now) => {
                for id in missing {
                    if now.contains(*id) {
                        session.record(Action::install(
                            category,
                            *id,
                            Outcome::Succeeded,
                            "installed",
                        ));
                    } else {
                        session.record(Action::install(
                            category,
                            *id,
                            Outcome::Failed,
                            error.to_string(),
                        ));
                    }
                }
            }
            Err(list_error) => {
                log::warn!("Could not re-check {category} after failed batch: {list_error}");
                for id in missing {
                    session.record(Action::install(
                        category,
                        *id,
                        Outcome::Failed,
                        error.to_string(),
                    ));
                }
            }
        }
    }

    fn reconcile_identity<P: ProgressCallback>(
        &self,
        session: &mut Session<'_, P>,
        prober: &Prober<'_>,
        desired: &StateDocument,
    ) {
        let category = Category::Identity;

        for field in IdentityField::ALL {
            let Some(wanted) = desired.git_identity.get(field) else {
                continue;
            };

            let current = match prober.identity(field) {
                Ok(value) => value,
                Err(e) => {
                    session.warn(category, format!("could not read git {}: {e}", field.key()));
                    None
                }
            };

            if current.as_deref() == Some(wanted) {
                session.record(Action::configure(
                    category,
                    field.key(),
                    Outcome::SkippedAlreadyPresent,
                    format!("already set to {wanted}"),
                ));
                continue;
            }

            let change = format!("{} -> {wanted}", current.as_deref().unwrap_or("<unset>"));
            if self.options.dry_run {
                session.record(Action::configure(
                    category,
                    field.key(),
                    Outcome::Pending,
                    format!("would set {}: {change}", field.key()),
                ));
                continue;
            }

            match self.backends.identity.set(field, wanted) {
                Ok(()) => session.record(Action::configure(
                    category,
                    field.key(),
                    Outcome::Succeeded,
                    change,
                )),
                Err(e) => session.record(Action::configure(
                    category,
                    field.key(),
                    Outcome::Failed,
                    e.to_string(),
                )),
            }
        }
    }
}
