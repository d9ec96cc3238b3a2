//! On-disk route cache.
//!
//! The cache is one JSON file holding a whole [`RouteTable`]. Its own
//! modification time is the cache timestamp; there is no separate field.
//! A save stamps the file with the time its scan started, so a controller
//! edited while the scan ran still reads as newer than the cache.
//!
//! # Staleness
//!
//! A missing cache is stale. A cache younger than the minimum age is fresh no
//! matter what changed on disk: the minimum age is a debounce window, and
//! controllers edited inside it stay invisible until it elapses. Past the
//! window, any controller artifact modified after the cache makes it stale.
//!
//! # Writers
//!
//! Several processes may share one cache file. A save first elects itself
//! single writer by taking an exclusive OS lock on `<cache>.lock`, then writes
//! a temporary file next to the cache and renames it over the cache. Readers
//! see either the old table or the new one, never a torn write. A writer that
//! loses the election skips its save: every save is a full rebuild, so the
//! winner's table is just as current.
//!
//! The lock file itself is never removed. The OS releases the lock when the
//! holder closes it or exits, so a crashed writer cannot wedge the cache.

use std::fs::{self, File, OpenOptions, TryLockError};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::Error;
use crate::extract::list_artifacts;
use crate::table::RouteTable;

/// What [`CacheStore::save`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Save {
    Written,
    /// Another writer held the lock.
    Skipped,
}

/// Reads and writes the route cache at a fixed path.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time of the cache file, `None` if there is none.
    pub fn modified(&self) -> Result<Option<SystemTime>, Error> {
        match fs::metadata(&self.path) {
            Ok(meta) => meta.modified().map(Some).map_err(|e| Error::io(&self.path, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    /// Whether the cache must be rebuilt from the `extension` artifacts in
    /// `controllers`. The directory is only listed once the cache is at least
    /// `min_age` old.
    pub fn is_stale(&self, controllers: &Path, extension: &str, min_age: Duration) -> Result<bool, Error> {
        self.is_stale_at(SystemTime::now(), controllers, extension, min_age)
    }

    /// [`is_stale`](Self::is_stale) evaluated at `now`.
    pub fn is_stale_at(
        &self,
        now: SystemTime,
        controllers: &Path,
        extension: &str,
        min_age: Duration,
    ) -> Result<bool, Error> {
        let Some(cached_at) = self.modified()? else {
            return Ok(true);
        };

        // A cache stamped in the future counts as brand new.
        let age = now.duration_since(cached_at).unwrap_or(Duration::ZERO);
        if age < min_age {
            debug!(age = ?age, min_age = ?min_age, "route cache inside debounce window");
            return Ok(false);
        }

        for artifact in list_artifacts(controllers, extension)? {
            let changed = fs::metadata(&artifact)
                .and_then(|m| m.modified())
                .map_err(|e| Error::io(&artifact, e))?;
            if changed > cached_at {
                debug!(artifact = %artifact.display(), "controller newer than route cache");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Reads the whole table. A file that does not decode is
    /// [`Error::CacheCorrupt`].
    pub fn load(&self) -> Result<RouteTable, Error> {
        let raw = fs::read(&self.path).map_err(|e| Error::io(&self.path, e))?;
        serde_json::from_slice(&raw).map_err(|source| Error::CacheCorrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replaces the cache with `table`, atomically and under the writer lock.
    /// The new file's mtime is `scanned_at`, the moment the scan that built
    /// `table` began.
    pub fn save(&self, table: &RouteTable, scanned_at: SystemTime) -> Result<Save, Error> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

        let Some(_lock) = WriteLock::acquire(&self.lock_path())? else {
            info!(cache = %self.path.display(), "route cache locked by another writer, skipping save");
            return Ok(Save::Skipped);
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
        serde_json::to_writer(tmp.as_file_mut(), table).map_err(Error::CacheEncode)?;
        let file = tmp.as_file();
        file.set_modified(scanned_at)
            .and_then(|()| file.sync_all())
            .map_err(|e| Error::io(tmp.path(), e))?;
        tmp.persist(&self.path).map_err(|e| Error::io(&self.path, e.error))?;

        debug!(cache = %self.path.display(), routes = table.len(), "route cache written");
        Ok(Save::Written)
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }
}

/// Exclusive OS lock on `<cache>.lock`, held for as long as the file is open.
struct WriteLock {
    _file: File,
}

impl WriteLock {
    /// `None` when another open handle, in this process or any other, holds
    /// the lock.
    fn acquire(path: &Path) -> Result<Option<Self>, Error> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        match file.try_lock() {
            Ok(()) => Ok(Some(Self { _file: file })),
            Err(TryLockError::WouldBlock) => Ok(None),
            Err(TryLockError::Error(e)) => Err(Error::io(path, e)),
        }
    }
}
