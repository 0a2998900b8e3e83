//! On-disk icon cache: one `<name>.png` or `<name>.notfound` per icon.

use crate::error::{AppsError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BITMAP_EXT: &str = "png";
const SENTINEL_EXT: &str = "notfound";

/// What the cache knows about an icon name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEntry {
    Bitmap(PathBuf),
    NotFound,
    Missing,
}

/// Cache directory handle. The directory itself is created on first write.
#[derive(Clone, Debug)]
pub struct IconCache {
    dir: PathBuf,
}

impl IconCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn bitmap_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{BITMAP_EXT}"))
    }

    pub fn sentinel_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{SENTINEL_EXT}"))
    }

    pub fn lookup(&self, name: &str) -> CacheEntry {
        let bitmap = self.bitmap_path(name);
        if bitmap.is_file() {
            return CacheEntry::Bitmap(bitmap);
        }
        if self.sentinel_path(name).is_file() {
            return CacheEntry::NotFound;
        }
        CacheEntry::Missing
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| AppsError::io(&self.dir, e))
    }

    /// Copy a PNG into the cache unchanged.
    pub fn store_copy(&self, name: &str, source: &Path) -> Result<PathBuf> {
        self.ensure_dir()?;
        let dest = self.bitmap_path(name);
        fs::copy(source, &dest).map_err(|e| AppsError::io(source, e))?;
        self.discard(&self.sentinel_path(name));
        Ok(dest)
    }

    /// Accept a bitmap written at `bitmap_path(name)` by the converter.
    /// `None` if nothing was written.
    pub fn commit_bitmap(&self, name: &str) -> Option<PathBuf> {
        let dest = self.bitmap_path(name);
        if !dest.is_file() {
            return None;
        }
        self.discard(&self.sentinel_path(name));
        Some(dest)
    }

    /// Write the "not found" marker, dropping any stale bitmap.
    pub fn mark_not_found(&self, name: &str) -> Result<PathBuf> {
        self.ensure_dir()?;
        let sentinel = self.sentinel_path(name);
        fs::write(&sentinel, b"").map_err(|e| AppsError::io(&sentinel, e))?;
        self.discard(&self.bitmap_path(name));
        Ok(sentinel)
    }

    fn discard(&self, path: &Path) {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                debug!("Could not remove stale cache file {}: {}", path.display(), e);
            }
        }
    }
}

/// True when every cache entry is older than `expiry`.
/// An absent or empty directory is never expired.
pub fn cache_is_expired(dir: &Path, expiry: Duration) -> bool {
    let Ok(entries) = fs::read_dir(dir) else {
        return false;
    };
    let cutoff = SystemTime::now()
        .checked_sub(expiry)
        .unwrap_or(SystemTime::UNIX_EPOCH);

    let mut seen_any = false;
    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
            continue;
        };
        seen_any = true;
        if modified >= cutoff {
            return false;
        }
    }

    seen_any
}
