//! Directory listing filtered by entry type.
//!
//! Entries come back in the order the OS returns them; `.` and `..` are never
//! included.

use crate::core::{FsError, FsOperation};
use std::ffi::OsString;
use std::fs;
use std::path::Path;

/// Names of every entry in `path`.
///
/// # Errors
///
/// Failure to open or read the directory.
pub fn list_dir(path: &Path) -> Result<Vec<OsString>, FsError> {
    list_matching(path, |_, _| Ok(true))
}

/// Names of the regular files in `path`.
///
/// With `follow_symlinks` a symlink counts when its target is a regular file;
/// without it symlinks are never listed. Dangling links are skipped.
///
/// # Errors
///
/// Failure to open or read the directory.
pub fn list_dir_files(path: &Path, follow_symlinks: bool) -> Result<Vec<OsString>, FsError> {
    list_matching(path, |entry, file_type| {
        if file_type.is_symlink() {
            if !follow_symlinks {
                return Ok(false);
            }
            return Ok(fs::metadata(entry).is_ok_and(|m| m.is_file()));
        }
        Ok(file_type.is_file())
    })
}

/// Names of the subdirectories of `path`.
///
/// Symlinks to directories count only with `follow_symlinks`.
///
/// # Errors
///
/// Failure to open or read the directory.
pub fn list_dir_dirs(path: &Path, follow_symlinks: bool) -> Result<Vec<OsString>, FsError> {
    list_matching(path, |entry, file_type| {
        if file_type.is_symlink() {
            if !follow_symlinks {
                return Ok(false);
            }
            return Ok(fs::metadata(entry).is_ok_and(|m| m.is_dir()));
        }
        Ok(file_type.is_dir())
    })
}

fn list_matching<F>(path: &Path, mut keep: F) -> Result<Vec<OsString>, FsError>
where
    F: FnMut(&Path, fs::FileType) -> Result<bool, FsError>,
{
    let entries = fs::read_dir(path).map_err(|e| FsError::from_io(FsOperation::ListDir, path, e))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| FsError::from_io(FsOperation::ListDir, path, e))?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| FsError::from_io(FsOperation::Stat, &entry_path, e))?;
        if keep(&entry_path, file_type)? {
            names.push(entry.file_name());
        }
    }
    Ok(names)
}
