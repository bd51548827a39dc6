//! The one command: reconcile the desired document against this Mac

use anyhow::{Context, Result};
use appkit::AppInstaller;
use declarative::{Backends, Prober, ReconcileOptions, Reconciler, RunReport};
use std::path::Path;

use crate::config;
use crate::paths;
use crate::progress::TerminalProgress;
use crate::runlog;
use crate::sources::{AppStore, DirectDownloads, GitConfig, Homebrew};
use crate::ui;

/// Load the document, reconcile every category and persist the results
///
/// Errors are returned only for problems that stop the run before any
/// side effect (no or malformed document). Per-item failures end up in the
/// report.
pub fn run(dry_run: bool) -> Result<RunReport> {
    ui::header(if dry_run {
        "macsetup (dry run)"
    } else {
        "macsetup"
    });

    let config_dir = paths::config_dir()?;
    let desired = config::load_desired(&config_dir)?;
    if desired.bootstrapped {
        ui::info(&format!(
            "Created {} from {}",
            desired.path.display(),
            config::SNAPSHOT_JSON
        ));
    }
    ui::kv("desired", &desired.path.display().to_string());

    let registry = config::registry(&desired.document)?;
    let applications_dir = paths::applications_dir();
    ui::kv("applications", &applications_dir.display().to_string());

    if dry_run {
        ui::warn("Dry run - no changes will be made");
    }

    let homebrew = Homebrew::new();
    let store = AppStore::new(&homebrew);
    let downloads = DirectDownloads::new(AppInstaller::new(registry, applications_dir));
    let identity = GitConfig::global();
    let backends = Backends {
        packages: &homebrew,
        store: &store,
        downloads: &downloads,
        identity: &identity,
    };

    let report = {
        let mut progress = TerminalProgress::new();
        Reconciler::new(&backends, ReconcileOptions { dry_run }).run(&desired.document, &mut progress)
    };

    ui::summary(&report);

    match paths::logs_dir().and_then(|dir| runlog::write(&dir, &report)) {
        Ok(path) => ui::dim(&format!("Log written to {}", path.display())),
        Err(e) => ui::warn(&format!("Could not write run log: {e:#}")),
    }

    if !dry_run {
        let snapshot = config::snapshot_path(&config_dir);
        match refresh_snapshot(&backends, &snapshot) {
            Ok(()) => ui::dim(&format!("Snapshot refreshed at {}", snapshot.display())),
            Err(e) => ui::warn(&format!("Could not refresh snapshot: {e:#}")),
        }
    }

    Ok(report)
}

/// Re-probe every category and rewrite the installed-state snapshot
fn refresh_snapshot(backends: &Backends<'_>, path: &Path) -> Result<()> {
    let snapshot = Prober::new(backends).snapshot();
    snapshot
        .save(path)
        .with_context(|| format!("Could not save {}", path.display()))?;
    log::info!("Snapshot: {} items", snapshot.len());
    Ok(())
}
