//! Point-in-time snapshots of filesystem entries.

use crate::core::{FsError, FsOperation};
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::Path;

/// Owner read, write and execute bits.
pub const OWNER_RWX: u32 = 0o700;
/// Set-group-id bit.
pub const SET_GID: u32 = 0o2000;
/// Permission bits including setuid, setgid and sticky.
pub const PERMISSION_BITS: u32 = 0o7777;

/// What kind of entry a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A directory (after following symlinks for [`DirEntryStat::stat`])
    Directory,
    /// Anything that is not a directory
    Other,
    /// Nothing exists at the path
    Absent,
}

/// Snapshot of an entry's type, mode bits, and ownership.
///
/// Taken once per visit and never cached: the filesystem may change between two
/// snapshots of the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntryStat {
    /// Entry type
    pub kind: EntryKind,
    /// Full `st_mode`, including the file type bits
    pub mode: u32,
    /// Owning user id
    pub uid: u32,
    /// Owning group id
    pub gid: u32,
}

impl DirEntryStat {
    /// Snapshot for a path where nothing exists.
    pub const ABSENT: Self = Self {
        kind: EntryKind::Absent,
        mode: 0,
        uid: 0,
        gid: 0,
    };

    /// `stat(2)` the path, following symlinks.
    ///
    /// A missing path yields [`EntryKind::Absent`] rather than an error.
    ///
    /// # Errors
    ///
    /// Any failure other than "not found", classified by [`FsError::from_io`].
    pub fn stat(path: &Path) -> Result<Self, FsError> {
        Self::from_result(path, fs::metadata(path))
    }

    /// `lstat(2)` the path, without following a trailing symlink.
    ///
    /// # Errors
    ///
    /// Any failure other than "not found", classified by [`FsError::from_io`].
    pub fn lstat(path: &Path) -> Result<Self, FsError> {
        Self::from_result(path, fs::symlink_metadata(path))
    }

    fn from_result(path: &Path, result: std::io::Result<fs::Metadata>) -> Result<Self, FsError> {
        match result {
            Ok(metadata) => Ok(Self::from_metadata(&metadata)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::ABSENT),
            Err(e) => Err(FsError::from_io(FsOperation::Stat, path, e)),
        }
    }

    /// Build a snapshot from already-fetched metadata.
    pub fn from_metadata(metadata: &fs::Metadata) -> Self {
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };
        Self {
            kind,
            mode: metadata.mode(),
            uid: metadata.uid(),
            gid: metadata.gid(),
        }
    }

    /// Whether anything exists at the path.
    pub const fn exists(&self) -> bool {
        !matches!(self.kind, EntryKind::Absent)
    }

    /// Whether the entry is a directory.
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    /// Permission bits (`mode & 0o7777`).
    pub const fn permissions(&self) -> u32 {
        self.mode & PERMISSION_BITS
    }

    /// Whether the set-group-id bit is set.
    pub const fn has_setgid(&self) -> bool {
        self.mode & SET_GID != 0
    }

    /// Whether all of owner read, write and execute are set.
    pub const fn owner_has_rwx(&self) -> bool {
        self.mode & OWNER_RWX == OWNER_RWX
    }
}
