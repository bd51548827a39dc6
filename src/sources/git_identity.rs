//! Global git identity through `git config`

use declarative::{IdentityField, IdentityStore, InstallError};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Reads and writes `user.name` / `user.email`
pub struct GitConfig {
    /// `None` targets the global config, otherwise this file
    file: Option<PathBuf>,
}

impl GitConfig {
    /// The user's global git config
    pub fn global() -> Self {
        Self { file: None }
    }

    /// A specific config file
    #[cfg(test)]
    pub fn with_file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
        }
    }

    fn git(&self, args: &[&str]) -> Result<Output, InstallError> {
        let git = which::which("git").map_err(|_| InstallError::ToolMissing {
            tool: "git".to_string(),
        })?;

        let mut command = Command::new(git);
        command.arg("config");
        match &self.file {
            Some(file) => command.arg("--file").arg(file),
            None => command.arg("--global"),
        };
        log::debug!("git config {}", args.join(" "));
        command
            .args(args)
            .output()
            .map_err(|e| InstallError::failed(format!("failed to execute git: {e}")))
    }
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim();
    if message.is_empty() {
        format!("git config exited with {}", output.status)
    } else {
        message.to_string()
    }
}

impl IdentityStore for GitConfig {
    fn get(&self, field: IdentityField) -> Result<Option<String>, InstallError> {
        let output = self.git(&["--get", field.key()])?;
        if output.status.success() {
            let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok((!value.is_empty()).then_some(value));
        }
        // Exit status 1 means the key is not set
        if output.status.code() == Some(1) {
            return Ok(None);
        }
        Err(InstallError::failed(stderr_message(&output)))
    }

    fn set(&self, field: IdentityField, value: &str) -> Result<(), InstallError> {
        let output = self.git(&[field.key(), value])?;
        if !output.status.success() {
            return Err(InstallError::failed(stderr_message(&output)));
        }
        Ok(())
    }
}
