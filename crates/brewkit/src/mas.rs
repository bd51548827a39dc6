//! Mac App Store access through the `mas` command-line tool.
//!
//! `mas` needs a signed-in App Store session for both listing purchases and
//! installing. A missing session surfaces as [`Error::NotSignedIn`].

use crate::error::{Error, Result};
use crate::types::MasApp;
use regex::Regex;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::LazyLock;

/// One `mas list` line: `497799835  Xcode  (14.3)`, the version is optional.
static LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s+(.*?)(?:\s+\(([^()]*)\))?\s*$")
        .expect("LIST_LINE is a valid regex pattern")
});

const MAS_PATHS: [&str; 2] = ["/opt/homebrew/bin/mas", "/usr/local/bin/mas"];

/// Handle to the `mas` executable.
#[derive(Debug, Clone)]
pub struct MasCli {
    path: PathBuf,
}

impl MasCli {
    /// Locate `mas`.
    pub fn new() -> Result<Self> {
        let path = find_mas().ok_or(Error::MasNotFound)?;
        Ok(Self { path })
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        log::debug!("mas {}", args.join(" "));
        Command::new(&self.path)
            .args(args)
            .output()
            .map_err(|e| Error::CommandFailed {
                message: format!("failed to execute mas: {e}"),
                stderr: String::new(),
            })
    }

    /// Fail with [`Error::NotSignedIn`] when no account is signed in.
    ///
    /// Recent macOS releases no longer let `mas account` report the
    /// account; that answer is treated as signed in and left to `list`.
    pub fn check_signed_in(&self) -> Result<()> {
        let output = self.run(&["account"])?;
        if output.status.success() {
            return Ok(());
        }

        let text = combined_output(&output);
        if text.to_lowercase().contains("not supported") {
            log::debug!("mas account unsupported, assuming signed in");
            return Ok(());
        }
        Err(Error::from_mas_output(&text, None))
    }

    /// Apps installed from the App Store.
    pub fn list(&self) -> Result<Vec<MasApp>> {
        self.check_signed_in()?;
        let output = self.run(&["list"])?;
        if !output.status.success() {
            let text = combined_output(&output);
            // An empty purchase list is reported as an error by some versions.
            if text.to_lowercase().contains("no installed apps") {
                return Ok(Vec::new());
            }
            return Err(Error::from_mas_output(&text, None));
        }
        Ok(parse_list(&String::from_utf8_lossy(&output.stdout)))
    }

    /// Install an app by its numeric identifier.
    pub fn install(&self, app_id: &str) -> Result<()> {
        self.check_signed_in()?;
        let output = self.run(&["install", app_id])?;
        if !output.status.success() {
            return Err(Error::from_mas_output(&combined_output(&output), Some(app_id)));
        }
        Ok(())
    }
}

/// Find the mas executable path.
pub fn find_mas() -> Option<PathBuf> {
    which::which("mas").ok().or_else(|| {
        MAS_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    })
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{}\n{}", stderr.trim(), stdout.trim())
        .trim()
        .to_string()
}

/// Parse `mas list` output.
pub fn parse_list(output: &str) -> Vec<MasApp> {
    output
        .lines()
        .filter_map(|line| {
            let caps = LIST_LINE.captures(line)?;
            let name = caps.get(2)?.as_str().trim();
            if name.is_empty() {
                return None;
            }
            Some(MasApp {
                id: caps[1].to_string(),
                name: name.to_string(),
                version: caps
                    .get(3)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
            })
        })
        .collect()
}
