//! Persisted run logs
//!
//! One file per run in `<state dir>/logs/`, named from the run's start time.
//! Files are created with create-new semantics and never overwritten; a
//! second run within the same second gets a numeric suffix.

use anyhow::{Context, Result, bail};
use declarative::RunReport;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const MAX_SUFFIX: usize = 1000;

fn file_name(stamp: &str, suffix: usize) -> String {
    if suffix == 0 {
        format!("run-{stamp}.log")
    } else {
        format!("run-{stamp}-{suffix}.log")
    }
}

/// Write the report's log into `logs_dir` and return the file path
pub fn write(logs_dir: &Path, report: &RunReport) -> Result<PathBuf> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("Could not create {}", logs_dir.display()))?;

    let stamp = report.started_at().format("%Y%m%d-%H%M%S").to_string();
    let content = report.render_log();

    for suffix in 0..MAX_SUFFIX {
        let path = logs_dir.join(file_name(&stamp, suffix));
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Could not create {}", path.display()));
            }
        };
        file.write_all(content.as_bytes())
            .with_context(|| format!("Could not write {}", path.display()))?;
        log::debug!("Run log written to {}", path.display());
        return Ok(path);
    }

    bail!("Too many run logs for {stamp} in {}", logs_dir.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use declarative::{Action, Category, Outcome, RunRecorder};
    use tempfile::TempDir;

    fn report() -> RunReport {
        let started = Local.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap();
        let mut recorder = RunRecorder::started_at(false, started);
        recorder.record(Action::install(
            Category::Formulae,
            "jq",
            Outcome::Succeeded,
            "",
        ));
        recorder.finish_at(started)
    }

    #[test]
    fn test_file_named_from_start_time() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), &report()).unwrap();

        assert_eq!(path, dir.path().join("run-20260314-092653.log"));
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("jq"));
        assert!(content.contains("summary: 1 succeeded"));
    }

    #[test]
    fn test_collision_gets_suffix() {
        let dir = TempDir::new().unwrap();
        let first = write(dir.path(), &report()).unwrap();
        fs::write(&first, "keep me").unwrap();

        let second = write(dir.path(), &report()).unwrap();
        let third = write(dir.path(), &report()).unwrap();

        assert_eq!(second, dir.path().join("run-20260314-092653-1.log"));
        assert_eq!(third, dir.path().join("run-20260314-092653-2.log"));
        assert_eq!(fs::read_to_string(&first).unwrap(), "keep me");
    }

    #[test]
    fn test_creates_logs_dir() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("state").join("logs");
        let path = write(&logs, &report()).unwrap();
        assert!(path.starts_with(&logs));
    }
}
