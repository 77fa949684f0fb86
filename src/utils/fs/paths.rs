//! Path canonicalization: joining, lexical normalization, and absolute
//! resolution with a single level of symlink following.
//!
//! [`join_path`] and [`normalize_path`] are pure and never touch the filesystem.
//! [`resolve_symlink_once`] and [`resolve_absolute_path`] read at most one
//! symlink and never cache anything.

use crate::core::{FsError, FsOperation};
use std::ffi::OsStr;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Joins path segments with the OS separator.
///
/// Follows the platform join contract: an absolute segment discards everything
/// before it. No validation or normalization is performed.
///
/// # Examples
///
/// ```rust
/// use fsguard::utils::fs::join_path;
/// use std::path::PathBuf;
///
/// assert_eq!(join_path(["/usr", "portage", "dev-util"]), PathBuf::from("/usr/portage/dev-util"));
/// assert_eq!(join_path(["/usr", "/etc", "passwd"]), PathBuf::from("/etc/passwd"));
/// ```
pub fn join_path<I, P>(segments: I) -> PathBuf
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut joined = PathBuf::new();
    for segment in segments {
        joined.push(segment);
    }
    joined
}

/// Normalizes a path by resolving `.` and `..` components lexically.
///
/// This function:
/// - Collapses redundant separators, including a doubled leading `//`
/// - Removes `.` (current directory) components
/// - Resolves `..` against the preceding concrete component; `..` directly
///   under the root is dropped, while leading `..` of a relative path is kept
/// - Strips any trailing separator
///
/// An empty result becomes `.`. The filesystem is never consulted, so symlinks
/// are not taken into account. The result is a fixed point:
/// `normalize_path(&normalize_path(p)) == normalize_path(p)`.
///
/// # Examples
///
/// ```rust
/// use fsguard::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize_path(Path::new("//usr//local/../bin")), PathBuf::from("/usr/bin"));
/// assert_eq!(normalize_path(Path::new("../src/./lib.rs")), PathBuf::from("../src/lib.rs"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut has_root = false;
    let mut parts: Vec<&OsStr> = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) => {}
            Component::RootDir => has_root = true,
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(last) if *last != OsStr::new("..") => {
                    parts.pop();
                }
                _ if has_root => {}
                _ => parts.push(OsStr::new("..")),
            },
            Component::Normal(name) => parts.push(name),
        }
    }

    let mut normalized = if has_root {
        PathBuf::from("/")
    } else {
        PathBuf::new()
    };
    normalized.extend(parts);

    if normalized.as_os_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

/// Reads the target of the symlink at `path` and returns it normalized.
///
/// A relative target is resolved against `path`'s parent directory. Only the
/// link itself is read; symlinks inside the target are left alone.
///
/// # Errors
///
/// - [`FsError::NotASymlink`] when `path` exists but is not a symlink
/// - [`FsError::NotFound`] when `path` does not exist
/// - any other classification from [`FsError::from_io`]
pub fn resolve_symlink_once(path: &Path) -> Result<PathBuf, FsError> {
    let target = fs::read_link(path).map_err(|e| FsError::from_io(FsOperation::ReadLink, path, e))?;

    let resolved = if target.is_absolute() {
        target
    } else {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(target),
            _ => target,
        }
    };

    Ok(normalize_path(&resolved))
}

/// Resolves `path` to an absolute path, following at most one symlink.
///
/// The OS-absolute form is computed first (current directory joined and
/// normalized). If that path is a symlink its target is returned via
/// [`resolve_symlink_once`], even when the target does not exist. If it is not a
/// symlink, or does not exist, the absolute form is returned unchanged.
///
/// Only one level is resolved; a symlink pointing at another symlink yields the
/// intermediate link, not the final file.
///
/// # Errors
///
/// Any failure other than "not a symlink" or "not found" propagates, e.g.
/// permission denied on an intermediate component or a non-directory component.
pub fn resolve_absolute_path(path: &Path) -> Result<PathBuf, FsError> {
    let absolute = std::path::absolute(path)
        .map_err(|e| FsError::from_io(FsOperation::CurrentDir, path, e))?;
    let absolute = normalize_path(&absolute);

    match resolve_symlink_once(&absolute) {
        Ok(target) => Ok(target),
        Err(FsError::NotASymlink { .. } | FsError::NotFound { .. }) => Ok(absolute),
        Err(e) => Err(e),
    }
}
