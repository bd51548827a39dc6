//! Downloading vendor archives.
//!
//! Use [`MockFetcher`] for testing without network access:
//!
//! ```
//! use appkit::fetch::{Fetcher, MockFetcher};
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let dest = tmp.path().join("widget.zip");
//!
//! let fetcher = MockFetcher::new().with_file("https://example.com/widget.zip", b"PK".to_vec());
//! fetcher.fetch("https://example.com/widget.zip", &dest).unwrap();
//! assert_eq!(std::fs::read(&dest).unwrap(), b"PK");
//! ```

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Maximum download size (2 GiB).
const MAX_DOWNLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

/// Something that can download a URL to a file.
pub trait Fetcher: Send + Sync {
    /// Download `url` into `dest`, replacing it.
    fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

/// Blocking HTTP fetcher.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    /// Create a fetcher with default agent settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        log::info!("Downloading {url}");
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", "macsetup")
            .call()?;

        let mut reader = response
            .body_mut()
            .with_config()
            .limit(MAX_DOWNLOAD_SIZE)
            .reader();

        let mut file = File::create(dest).map_err(|e| Error::io(dest, e))?;
        let bytes = io::copy(&mut reader, &mut file).map_err(|e| Error::http(e.to_string(), None))?;
        log::debug!("Downloaded {bytes} bytes to {}", dest.display());
        Ok(())
    }
}

/// Mock fetcher serving in-memory files.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    requests: Arc<Mutex<Vec<String>>>,
    destinations: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `data` for `url`.
    #[must_use]
    pub fn with_file(self, url: impl Into<String>, data: Vec<u8>) -> Self {
        if let Ok(mut files) = self.files.lock() {
            files.insert(url.into(), data);
        }
        self
    }

    /// URLs requested so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Paths downloads were written to, in request order.
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

impl Fetcher for MockFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        if let Ok(mut destinations) = self.destinations.lock() {
            destinations.push(dest.to_path_buf());
        }
        let data = self
            .files
            .lock()
            .ok()
            .and_then(|files| files.get(url).cloned())
            .ok_or_else(|| Error::http("HTTP 404", Some(404)))?;
        std::fs::write(dest, data).map_err(|e| Error::io(dest, e))
    }
}
