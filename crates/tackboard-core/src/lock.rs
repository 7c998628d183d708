//! Per-column write linearization.
//!
//! Every operation that reads a column and then writes a renumbering of it
//! holds the column's lock for the whole read-compute-write cycle. Two layers:
//!
//! - an in-process set of held column ids (mutex + condvar), so threads
//!   sharing one [`ColumnLocks`] serialize without touching the filesystem
//! - optionally, an exclusive `fs2` advisory lock on
//!   `<lock_dir>/col-<blake3(column_id)>.lock`, so separate processes
//!   serialize too
//!
//! Multi-column acquisitions take ids in sorted order, which rules out
//! lock-order deadlocks between concurrent moves.

use fs2::FileExt;
use std::{
    collections::BTreeSet,
    fs::{self, File, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::{Condvar, Mutex},
    thread,
    time::{Duration, Instant},
};

use crate::error::ErrorCode;
use crate::model::ColumnId;

/// Default time to wait for a column lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const FILE_LOCK_POLL: Duration = Duration::from_millis(10);

/// Column lock errors.
#[derive(Debug)]
pub enum LockError {
    Timeout { column_id: ColumnId, waited: Duration },
    IoError(io::Error),
}

impl From<io::Error> for LockError {
    fn from(err: io::Error) -> Self {
        Self::IoError(err)
    }
}

impl LockError {
    /// Machine-readable code associated with this lock error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Timeout { .. } => ErrorCode::LockContention,
            Self::IoError(_) => ErrorCode::StoreFailure,
        }
    }

    /// Optional remediation hint.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl std::fmt::Display for LockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { column_id, waited } => write!(
                f,
                "{}: lock on column {column_id} timed out after {waited:?}",
                self.code().code()
            ),
            Self::IoError(err) => write!(f, "{}: {}", self.code().code(), err),
        }
    }
}

impl std::error::Error for LockError {}

// ---------------------------------------------------------------------------
// File locks
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct FileGuard {
    file: File,
    path: PathBuf,
}

impl FileGuard {
    fn acquire(path: &Path, column_id: &ColumnId, deadline: Instant) -> Result<Self, LockError> {
        let parent = path.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "lock path has no parent")
        })?;
        fs::create_dir_all(parent)?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        loop {
            if file.try_lock_exclusive().is_ok() {
                return Ok(Self {
                    file,
                    path: path.to_path_buf(),
                });
            }

            if Instant::now() >= deadline {
                return Err(LockError::Timeout {
                    column_id: column_id.clone(),
                    waited: started.elapsed(),
                });
            }

            thread::sleep(FILE_LOCK_POLL);
        }
    }
}

impl Drop for FileGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Lock file path for one column: the blake3 hex digest of the id, so every
/// distinct id gets its own flat file name inside `lock_dir`.
#[must_use]
pub fn lock_file_path(lock_dir: &Path, column_id: &ColumnId) -> PathBuf {
    let digest = blake3::hash(column_id.as_str().as_bytes());
    lock_dir.join(format!("col-{}.lock", digest.to_hex()))
}

// ---------------------------------------------------------------------------
// Keyed lock registry
// ---------------------------------------------------------------------------

/// Registry of column locks shared by every operation of one board service.
#[derive(Debug)]
pub struct ColumnLocks {
    held: Mutex<BTreeSet<ColumnId>>,
    released: Condvar,
    lock_dir: Option<PathBuf>,
    timeout: Duration,
}

impl Default for ColumnLocks {
    fn default() -> Self {
        Self::in_process(DEFAULT_LOCK_TIMEOUT)
    }
}

impl ColumnLocks {
    /// Locks that only serialize threads of this process.
    #[must_use]
    pub fn in_process(timeout: Duration) -> Self {
        Self {
            held: Mutex::new(BTreeSet::new()),
            released: Condvar::new(),
            lock_dir: None,
            timeout,
        }
    }

    /// Locks that also take an advisory file lock per column in `lock_dir`.
    #[must_use]
    pub fn with_lock_dir(lock_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            lock_dir: Some(lock_dir.into()),
            ..Self::in_process(timeout)
        }
    }

    /// Acquire one column.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Timeout`] if the column stays locked past the
    /// configured timeout, or an I/O error from the lock file.
    pub fn lock(&self, column_id: &ColumnId) -> Result<ColumnGuard<'_>, LockError> {
        self.lock_all(std::slice::from_ref(column_id))
    }

    /// Acquire several columns at once, in sorted id order. Duplicate ids are
    /// collapsed, so a same-column move can pass the column twice.
    ///
    /// # Errors
    ///
    /// Same as [`ColumnLocks::lock`]. On error nothing stays held.
    pub fn lock_all(&self, column_ids: &[ColumnId]) -> Result<ColumnGuard<'_>, LockError> {
        let wanted: BTreeSet<ColumnId> = column_ids.iter().cloned().collect();
        let deadline = Instant::now() + self.timeout;

        self.claim(&wanted, deadline)?;
        let mut guard = ColumnGuard {
            locks: self,
            columns: wanted,
            files: Vec::new(),
        };

        if let Some(dir) = &self.lock_dir {
            for column_id in &guard.columns {
                let path = lock_file_path(dir, column_id);
                // Dropping `guard` on error releases what was taken so far.
                let file = FileGuard::acquire(&path, column_id, deadline)?;
                guard.files.push(file);
            }
        }

        tracing::trace!(columns = ?guard.columns, "column locks acquired");
        Ok(guard)
    }

    fn claim(&self, wanted: &BTreeSet<ColumnId>, deadline: Instant) -> Result<(), LockError> {
        let started = Instant::now();
        let mut held = self
            .held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        loop {
            let blocked = wanted.iter().find(|id| held.contains(*id)).cloned();
            let Some(blocked) = blocked else {
                held.extend(wanted.iter().cloned());
                return Ok(());
            };

            let now = Instant::now();
            if now >= deadline {
                return Err(LockError::Timeout {
                    column_id: blocked,
                    waited: started.elapsed(),
                });
            }

            let (next, _) = self
                .released
                .wait_timeout(held, deadline - now)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            held = next;
        }
    }

    fn release(&self, columns: &BTreeSet<ColumnId>) {
        let mut held = self
            .held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for id in columns {
            held.remove(id);
        }
        drop(held);
        self.released.notify_all();
    }
}

/// RAII guard over one or more locked columns. Released on drop.
#[derive(Debug)]
pub struct ColumnGuard<'a> {
    locks: &'a ColumnLocks,
    columns: BTreeSet<ColumnId>,
    files: Vec<FileGuard>,
}

impl ColumnGuard<'_> {
    /// Columns covered by this guard, in acquisition order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnId> {
        self.columns.iter()
    }

    /// Lock files held by this guard.
    pub fn lock_files(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(|f| f.path.as_path())
    }
}

impl Drop for ColumnGuard<'_> {
    fn drop(&mut self) {
        // File locks first, so another process never sees the in-process
        // set released while the file is still held.
        self.files.clear();
        self.locks.release(&self.columns);
    }
}
