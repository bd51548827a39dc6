//! macOS system tools: disk-image mounting and package installation.
//!
//! [`MountedImage`] detaches its image when dropped, so an image mounted
//! from a scratch directory is always detached before that directory is
//! removed as long as the guard is created after the directory.

use crate::error::{Error, Result};
use plist::{Dictionary, Value};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// System tools used by installers.
pub trait SystemTools: Send + Sync {
    /// Mount a disk image read-only and return its mount point.
    fn attach(&self, image: &Path) -> Result<PathBuf>;

    /// Unmount a mounted disk image.
    fn detach(&self, mount_point: &Path) -> Result<()>;

    /// Install a `.pkg` on the boot volume.
    fn install_pkg(&self, pkg: &Path) -> Result<()>;
}

/// Real tools: `hdiutil` and `installer`.
#[derive(Debug, Clone, Default)]
pub struct MacTools;

impl MacTools {
    fn tool(name: &str) -> Result<PathBuf> {
        which::which(name).map_err(|_| Error::ToolNotFound(name.to_string()))
    }
}

impl SystemTools for MacTools {
    fn attach(&self, image: &Path) -> Result<PathBuf> {
        let hdiutil = Self::tool("hdiutil")?;
        log::debug!("hdiutil attach {}", image.display());

        let mut child = Command::new(hdiutil)
            .args(["attach", "-nobrowse", "-readonly", "-noautoopen", "-plist"])
            .arg(image)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::command("hdiutil attach", e.to_string()))?;

        // Images with a license agreement wait for an answer on stdin.
        if let Some(mut stdin) = child.stdin.take() {
            let _ = stdin.write_all(b"Y\n");
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::command("hdiutil attach", e.to_string()))?;
        check("hdiutil attach", &output)?;
        parse_attach_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn detach(&self, mount_point: &Path) -> Result<()> {
        let hdiutil = Self::tool("hdiutil")?;
        let output = Command::new(&hdiutil)
            .arg("detach")
            .arg(mount_point)
            .arg("-quiet")
            .output()
            .map_err(|e| Error::command("hdiutil detach", e.to_string()))?;
        if output.status.success() {
            return Ok(());
        }

        log::debug!("hdiutil detach failed, forcing");
        let output = Command::new(&hdiutil)
            .arg("detach")
            .arg(mount_point)
            .args(["-force", "-quiet"])
            .output()
            .map_err(|e| Error::command("hdiutil detach", e.to_string()))?;
        check("hdiutil detach", &output)
    }

    fn install_pkg(&self, pkg: &Path) -> Result<()> {
        let installer = Self::tool("installer")?;
        log::info!("Installing package {}", pkg.display());
        // installer needs root; sudo prompts on the terminal if needed.
        let status = Command::new("sudo")
            .arg(installer)
            .arg("-pkg")
            .arg(pkg)
            .args(["-target", "/"])
            .status()
            .map_err(|e| Error::command("installer", e.to_string()))?;
        if !status.success() {
            return Err(Error::command("installer", status.to_string()));
        }
        Ok(())
    }
}

fn check(command: &str, output: &Output) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .map_or_else(|| output.status.to_string(), |l| l.trim().to_string());
    Err(Error::command(command, message))
}

/// Extract the mount point from `hdiutil attach -plist` output.
///
/// The plist may be preceded by license text.
pub fn parse_attach_output(stdout: &str) -> Result<PathBuf> {
    let start = stdout.find("<?xml").unwrap_or(0);
    let dict = parse_plist_dict(&stdout[start..])?;

    dict_get_array(&dict, "system-entities")
        .into_iter()
        .flatten()
        .filter_map(Value::as_dictionary)
        .find_map(|entity| dict_get_string(entity, "mount-point"))
        .map(PathBuf::from)
        .ok_or_else(|| Error::command("hdiutil attach", "no mount point in output"))
}

fn parse_plist_dict(plist: &str) -> Result<Dictionary> {
    let value = Value::from_reader(Cursor::new(plist.as_bytes()))
        .map_err(|e| Error::command("hdiutil attach", format!("unreadable plist: {e}")))?;

    match value {
        Value::Dictionary(dict) => Ok(dict),
        _ => Err(Error::command("hdiutil attach", "expected plist dictionary at root")),
    }
}

fn dict_get_string(dict: &Dictionary, key: &str) -> Option<String> {
    match dict.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        _ => None,
    }
}

fn dict_get_array<'a>(dict: &'a Dictionary, key: &str) -> Option<&'a Vec<Value>> {
    match dict.get(key) {
        Some(Value::Array(value)) => Some(value),
        _ => None,
    }
}

/// A mounted disk image, detached on drop.
pub struct MountedImage<'a> {
    tools: &'a dyn SystemTools,
    mount_point: PathBuf,
}

impl<'a> MountedImage<'a> {
    /// Mount `image`.
    pub fn attach(tools: &'a dyn SystemTools, image: &Path) -> Result<Self> {
        let mount_point = tools.attach(image)?;
        log::debug!("Mounted {} at {}", image.display(), mount_point.display());
        Ok(Self { tools, mount_point })
    }

    /// Root of the mounted volume.
    pub fn path(&self) -> &Path {
        &self.mount_point
    }
}

impl Drop for MountedImage<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.tools.detach(&self.mount_point) {
            log::warn!("Failed to detach {}: {e}", self.mount_point.display());
        }
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::Mutex;

    /// Event recorded by [`FakeTools`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Event {
        Attach(PathBuf),
        Detach(PathBuf),
        InstallPkg(PathBuf),
    }

    /// "Mounts" images by returning a prepared directory.
    pub struct FakeTools {
        pub volume: PathBuf,
        pub fail_pkg: bool,
        pub events: Mutex<Vec<Event>>,
    }

    impl FakeTools {
        pub fn new(volume: impl Into<PathBuf>) -> Self {
            Self {
                volume: volume.into(),
                fail_pkg: false,
                events: Mutex::new(Vec::new()),
            }
        }

        pub fn events(&self) -> Vec<Event> {
            self.events.lock().unwrap().clone()
        }
    }

    impl SystemTools for FakeTools {
        fn attach(&self, image: &Path) -> Result<PathBuf> {
            // A scratch-dir image must still exist when it is mounted.
            assert!(image.exists(), "image missing at attach time");
            self.events
                .lock()
                .unwrap()
                .push(Event::Attach(image.to_path_buf()));
            Ok(self.volume.clone())
        }

        fn detach(&self, mount_point: &Path) -> Result<()> {
            let mut events = self.events.lock().unwrap();
            // The image is detached before its scratch directory goes away.
            if let Some(Event::Attach(image)) =
                events.iter().rev().find(|e| matches!(e, Event::Attach(_)))
            {
                assert!(image.exists(), "image removed before detach");
            }
            events.push(Event::Detach(mount_point.to_path_buf()));
            Ok(())
        }

        fn install_pkg(&self, pkg: &Path) -> Result<()> {
            self.events
                .lock()
                .unwrap()
                .push(Event::InstallPkg(pkg.to_path_buf()));
            if self.fail_pkg {
                return Err(Error::command("installer", "exit status: 1"));
            }
            Ok(())
        }
    }
}
