//! Locating and copying application bundles.

use crate::error::{Error, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Depth searched below an image or archive root.
const SEARCH_DEPTH: usize = 3;

fn is_bundle_dir(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("app" | "pkg" | "mpkg")
    )
}

/// Find an entry named `bundle` below `root`.
///
/// Bundles are not searched inside, and symlinks (like the `Applications`
/// link on most disk images) are not followed.
pub fn find_bundle(root: &Path, bundle: &str) -> Option<PathBuf> {
    let mut walker = WalkDir::new(root).max_depth(SEARCH_DEPTH).into_iter();
    while let Some(entry) = walker.next() {
        let Ok(entry) = entry else { continue };
        if entry.depth() > 0 && entry.file_name() == bundle {
            return Some(entry.into_path());
        }
        if entry.depth() > 0 && entry.file_type().is_dir() && is_bundle_dir(entry.path()) {
            walker.skip_current_dir();
        }
    }
    None
}

/// Find the first installer package below `root`.
pub fn find_package(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(2)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .find(|e| {
            matches!(
                e.path().extension().and_then(|x| x.to_str()),
                Some("pkg" | "mpkg")
            )
        })
        .map(walkdir::DirEntry::into_path)
}

/// Copy a bundle into `dest_dir`, replacing any existing copy.
///
/// The copy is staged next to the destination and renamed into place, so a
/// failed copy never leaves a half-written bundle under the final name.
pub fn copy_bundle(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .ok_or_else(|| Error::io(src, io::Error::other("bundle has no file name")))?;
    let dest = dest_dir.join(name);
    let staging = dest_dir.join(format!(".{}.partial", name.to_string_lossy()));

    fs::create_dir_all(dest_dir).map_err(|e| Error::io(dest_dir, e))?;
    if staging.exists() {
        fs::remove_dir_all(&staging).map_err(|e| Error::io(&staging, e))?;
    }

    if let Err(e) = copy_tree(src, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    if dest.exists() {
        fs::remove_dir_all(&dest).map_err(|e| Error::io(&dest, e))?;
    }
    fs::rename(&staging, &dest).map_err(|e| Error::io(&dest, e))?;
    log::info!("Copied {} to {}", src.display(), dest.display());
    Ok(dest)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| Error::io(src, io::Error::other(e.to_string())))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::io(entry.path(), io::Error::other(e.to_string())))?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    std::os::unix::fs::symlink(link, dest)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest).map(|_| ())
}

/// Extract a zip archive into `dest`.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive).map_err(|e| Error::io(archive, e))?;
    let mut zip = zip::ZipArchive::new(file)?;
    fs::create_dir_all(dest).map_err(|e| Error::io(dest, e))?;
    zip.extract(dest)?;
    log::debug!("Extracted {} entries from {}", zip.len(), archive.display());
    Ok(())
}
