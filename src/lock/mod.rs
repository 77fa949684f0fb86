//! Advisory file locking for cross-process coordination.
//!
//! [`FsLock`] wraps `flock(2)` on a single descriptor. The file is opened lazily
//! on the first acquire, read-only, and stays open until the lock is closed or
//! dropped. Locks are advisory: processes that never ask for them are not kept
//! out.
//!
//! Shared and exclusive locks convert into each other in place. The conversion
//! is not guaranteed to be atomic: another process may slip in between.
//!
//! # Limitations
//!
//! - Not reentrant and not fair
//! - One handle is not meant to be shared between threads without external
//!   synchronization; use [`scoped`] to drive it from async code
//! - No network or cross-host locking guarantees

pub mod scoped;

use crate::core::LockError;
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Which lock to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    /// Read lock; any number may be held at once
    Shared,
    /// Write lock; excludes every other lock
    Exclusive,
}

/// What this handle believes it holds.
///
/// Bookkeeping only; the kernel is the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockState {
    /// Nothing held
    #[default]
    Unlocked,
    /// A shared lock
    Shared,
    /// An exclusive lock
    Exclusive,
}

/// An advisory read/write lock on a file or directory.
///
/// # Example
///
/// ```rust,no_run
/// use fsguard::lock::FsLock;
///
/// # fn example() -> Result<(), fsguard::core::LockError> {
/// let mut lock = FsLock::new("/var/cache/pkg/.lock", true)?;
/// if lock.acquire_write_lock(false)? {
///     // exclusive section
///     lock.release_write_lock()?;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FsLock {
    path: PathBuf,
    create: bool,
    file: Option<File>,
    state: LockState,
}

impl FsLock {
    /// Create a handle for `path` without opening it.
    ///
    /// With `create` the file is created on first acquire; its parent directory
    /// must already exist. A directory can be locked but never created.
    ///
    /// # Errors
    ///
    /// [`LockError::NonExistant`] when `create` is false and nothing exists at
    /// `path`.
    pub fn new(path: impl Into<PathBuf>, create: bool) -> Result<Self, LockError> {
        let path = path.into();
        if !create && std::fs::metadata(&path).is_err() {
            return Err(LockError::NonExistant { path, reason: None });
        }
        Ok(Self {
            path,
            create,
            file: None,
            state: LockState::Unlocked,
        })
    }

    /// The lock target.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a descriptor is currently open.
    pub const fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// The lock this handle believes it holds.
    pub const fn state(&self) -> LockState {
        self.state
    }

    /// Acquire an exclusive lock, converting a held shared lock.
    ///
    /// Returns `Ok(false)` only when `blocking` is false and another holder
    /// prevents the lock.
    ///
    /// # Errors
    ///
    /// - [`LockError::NonExistant`] when the file cannot be opened and `create`
    ///   is false
    /// - [`LockError::GenericFailed`] for open failures while creating and any
    ///   other lock failure
    pub fn acquire_write_lock(&mut self, blocking: bool) -> Result<bool, LockError> {
        self.acquire(LockKind::Exclusive, blocking)
    }

    /// Acquire a shared lock, converting a held exclusive lock.
    ///
    /// # Errors
    ///
    /// As for [`FsLock::acquire_write_lock`].
    pub fn acquire_read_lock(&mut self, blocking: bool) -> Result<bool, LockError> {
        self.acquire(LockKind::Shared, blocking)
    }

    /// Release whatever lock is held. No-op if the file was never opened.
    ///
    /// # Errors
    ///
    /// [`LockError::GenericFailed`] when the unlock call fails.
    pub fn release_write_lock(&mut self) -> Result<(), LockError> {
        self.release()
    }

    /// Release whatever lock is held. No-op if the file was never opened.
    ///
    /// # Errors
    ///
    /// [`LockError::GenericFailed`] when the unlock call fails.
    pub fn release_read_lock(&mut self) -> Result<(), LockError> {
        self.release()
    }

    /// Acquire `kind`, blocking or not.
    ///
    /// # Errors
    ///
    /// As for [`FsLock::acquire_write_lock`].
    pub fn acquire(&mut self, kind: LockKind, blocking: bool) -> Result<bool, LockError> {
        let file = self.open()?;

        let result = if blocking {
            lock_blocking(file, kind).map(|()| true)
        } else {
            match kind {
                LockKind::Shared => FileExt::try_lock_shared(file),
                LockKind::Exclusive => FileExt::try_lock_exclusive(file),
            }
        };

        match result {
            Ok(true) => {
                self.state = match kind {
                    LockKind::Shared => LockState::Shared,
                    LockKind::Exclusive => LockState::Exclusive,
                };
                debug!(path = %self.path.display(), ?kind, blocking, "Lock acquired");
                Ok(true)
            }
            Ok(false) => {
                trace!(path = %self.path.display(), ?kind, "Lock busy");
                Ok(false)
            }
            Err(source) => Err(LockError::GenericFailed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Release any lock and close the descriptor.
    ///
    /// A later acquire reopens the file. Unlock failures are ignored: closing
    /// the descriptor drops the lock regardless.
    pub fn close(&mut self) {
        if let Some(file) = self.file.take() {
            if let Err(e) = FileExt::unlock(&file) {
                debug!(path = %self.path.display(), error = %e, "Failed to unlock before close");
            }
            trace!(path = %self.path.display(), "Lock file closed");
        }
        self.state = LockState::Unlocked;
    }

    fn release(&mut self) -> Result<(), LockError> {
        let Some(file) = self.file.as_ref() else {
            return Ok(());
        };
        FileExt::unlock(file).map_err(|source| LockError::GenericFailed {
            path: self.path.clone(),
            source,
        })?;
        self.state = LockState::Unlocked;
        debug!(path = %self.path.display(), "Lock released");
        Ok(())
    }

    fn open(&mut self) -> Result<&File, LockError> {
        match &mut self.file {
            Some(file) => Ok(file),
            slot @ None => {
                let file = open_lock_file(&self.path, self.create)?;
                trace!(path = %self.path.display(), create = self.create, "Lock file opened");
                Ok(slot.insert(file))
            }
        }
    }
}

impl Drop for FsLock {
    fn drop(&mut self) {
        self.close();
    }
}

fn open_lock_file(path: &Path, create: bool) -> Result<File, LockError> {
    let mut options = OpenOptions::new();
    options.read(true);
    if create {
        // Read-only with O_CREAT; std's `create` insists on write access
        options.custom_flags(nix::libc::O_CREAT).mode(0o666);
        options.open(path).map_err(|source| LockError::GenericFailed {
            path: path.to_path_buf(),
            source,
        })
    } else {
        options.open(path).map_err(|e| LockError::NonExistant {
            path: path.to_path_buf(),
            reason: Some(e),
        })
    }
}

fn lock_blocking(file: &File, kind: LockKind) -> io::Result<()> {
    loop {
        let result = match kind {
            LockKind::Shared => FileExt::lock_shared(file),
            LockKind::Exclusive => FileExt::lock_exclusive(file),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
