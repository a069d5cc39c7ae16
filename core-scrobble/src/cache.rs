//! Storage for scrobbles waiting to be submitted.

use crate::error::Result;
use crate::scrobble::Scrobble;
use core_runtime::logging::strip_path;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Ordered queue of unsubmitted scrobbles.
///
/// Submission always takes entries from the front, so `remove(n)` after a
/// successful submission of `pending()[..n]` drops exactly what was sent even
/// if more entries were appended meanwhile.
pub trait ScrobbleCache: Send {
    fn append(&mut self, scrobbles: Vec<Scrobble>);

    fn pending(&self) -> &[Scrobble];

    /// Drops the first `count` entries.
    fn remove(&mut self, count: usize);
}

/// Cache that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryScrobbleCache {
    entries: Vec<Scrobble>,
}

impl MemoryScrobbleCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScrobbleCache for MemoryScrobbleCache {
    fn append(&mut self, scrobbles: Vec<Scrobble>) {
        self.entries.extend(scrobbles);
    }

    fn pending(&self) -> &[Scrobble] {
        &self.entries
    }

    fn remove(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
    }
}

/// Cache persisted as a JSON array, so plays survive restarts.
///
/// Every change rewrites the file through a sibling temporary file. A failed
/// write is logged and the in-memory entries stay authoritative; the next
/// change tries again.
#[derive(Debug)]
pub struct FileScrobbleCache {
    path: PathBuf,
    entries: Vec<Scrobble>,
}

impl FileScrobbleCache {
    /// Loads `path`, treating a missing or empty file as an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Vec::new(),
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        debug!(
            file = strip_path(&path.to_string_lossy()),
            entries = entries.len(),
            "Opened scrobble cache"
        );
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) {
        if let Err(e) = self.write() {
            warn!(
                file = strip_path(&self.path.to_string_lossy()),
                error = %e,
                "Failed to persist scrobble cache"
            );
        }
    }

    fn write(&self) -> Result<()> {
        if self.entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl ScrobbleCache for FileScrobbleCache {
    fn append(&mut self, scrobbles: Vec<Scrobble>) {
        self.entries.extend(scrobbles);
        self.persist();
    }

    fn pending(&self) -> &[Scrobble] {
        &self.entries
    }

    fn remove(&mut self, count: usize) {
        let count = count.min(self.entries.len());
        self.entries.drain(..count);
        self.persist();
    }
}
