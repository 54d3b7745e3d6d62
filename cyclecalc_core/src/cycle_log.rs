//! Persistent cycle log with file locking.
//!
//! The log holds the cycles a user has entered on the dashboard. It feeds the
//! fertile window estimator's history-based enrichment.

use crate::types::CycleHistoryEntry;
use crate::{Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Cycles recorded by the user, ordered by `period_start`
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct CycleLog {
    pub cycles: Vec<CycleHistoryEntry>,
}

impl CycleLog {
    /// Insert an entry, keeping the log ordered by start date
    ///
    /// An existing entry with the same `period_start` is replaced.
    pub fn record(&mut self, entry: CycleHistoryEntry) {
        match self
            .cycles
            .binary_search_by_key(&entry.period_start, |c| c.period_start)
        {
            Ok(idx) => {
                tracing::debug!("Replacing cycle starting {}", entry.period_start);
                self.cycles[idx] = entry;
            }
            Err(idx) => self.cycles.insert(idx, entry),
        }
    }

    /// The latest `n` entries, oldest first
    pub fn recent(&self, n: usize) -> &[CycleHistoryEntry] {
        let start = self.cycles.len().saturating_sub(n);
        &self.cycles[start..]
    }

    pub fn latest(&self) -> Option<&CycleHistoryEntry> {
        self.cycles.last()
    }

    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Load the log from a file with shared locking
    ///
    /// Returns an empty log if the file doesn't exist.
    /// If the file is corrupted, logs a warning and returns an empty log.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No cycle log found, starting empty");
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!("Unable to open cycle log {:?}: {}. Starting empty.", path, e);
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!("Unable to lock cycle log {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!("Failed to read cycle log {:?}: {}. Starting empty.", path, e);
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<CycleLog>(&contents) {
            Ok(mut log) => {
                log.cycles.sort_by_key(|c| c.period_start);
                tracing::debug!("Loaded {} cycles from {:?}", log.cycles.len(), path);
                Ok(log)
            }
            Err(e) => {
                tracing::warn!("Failed to parse cycle log {:?}: {}. Starting empty.", path, e);
                Ok(Self::default())
            }
        }
    }

    /// Save the log, holding the log's lock file for the duration
    ///
    /// Writes to a temp file in the same directory, syncs it, then renames it
    /// over the original.
    pub fn save(&self, path: &Path) -> Result<()> {
        let lock = acquire_lock(path)?;
        self.write_atomic(path)?;
        lock.unlock()?;
        Ok(())
    }

    /// Load the log, modify it, and save it back
    ///
    /// The lock file stays exclusively locked from load to rename, so
    /// concurrent updates are applied one after another.
    pub fn update<F>(path: &Path, f: F) -> Result<Self>
    where
        F: FnOnce(&mut CycleLog) -> Result<()>,
    {
        let lock = acquire_lock(path)?;
        let mut log = Self::load(path)?;
        f(&mut log)?;
        log.write_atomic(path)?;
        lock.unlock()?;
        Ok(log)
    }

    fn write_atomic(&self, path: &Path) -> Result<()> {
        let parent = parent_dir(path)?;
        let temp = NamedTempFile::new_in(parent)?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string_pretty(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} cycles to {:?}", self.cycles.len(), path);
        Ok(())
    }
}

/// Path of the lock file guarding `path`, e.g. `cycles.json.lock`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn parent_dir(path: &Path) -> Result<&Path> {
    path.parent()
        .ok_or_else(|| Error::Other(format!("cycle log path {:?} has no parent", path)))
}

/// Open and exclusively lock the stable lock file next to the log
///
/// The log itself is replaced by rename on every save, so it cannot carry
/// the lock. Dropping the returned handle also releases the lock.
fn acquire_lock(path: &Path) -> Result<File> {
    std::fs::create_dir_all(parent_dir(path)?)?;
    let lock = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_path(path))?;
    lock.lock_exclusive()?;
    Ok(lock)
}
