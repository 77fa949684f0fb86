//! Permission-aware directory provisioning.
//!
//! [`DirEnsurer`] makes sure a directory exists with a given mode and, optionally,
//! owner and group. Missing components are created one segment at a time with the
//! umask cleared, so the requested mode is applied verbatim.
//!
//! Existing intermediate directories that the caller could not traverse or write
//! (owner lacks `rwx`) are loosened for the duration of the walk and restored
//! afterwards. When the requested mode itself lacks owner `rwx`, new directories
//! are created `0700` first and switched to the final mode once everything below
//! them exists. Restorations happen deepest first.
//!
//! # Limitations
//!
//! - Not transactional: a failure partway through may leave directories created
//!   or permissions partially applied.
//! - The umask is process-wide; see [`crate::utils::fs::umask`].
//! - No retries. Losing a `mkdir` race is tolerated only when the winner created
//!   a directory.

use super::paths::normalize_path;
use super::stat::{DirEntryStat, OWNER_RWX};
use super::umask::UmaskGuard;
use crate::core::{FsError, FsOperation};
use anyhow::Context;
use std::fs::{self, DirBuilder, Permissions};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A directory whose mode must be set to `mode` once the walk is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionReset {
    /// Directory to chmod
    pub path: PathBuf,
    /// Mode to apply
    pub mode: u32,
}

impl PermissionReset {
    fn new(path: &Path, mode: u32) -> Self {
        Self {
            path: path.to_path_buf(),
            mode,
        }
    }
}

/// What an ensure call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnsureOutcome {
    /// The target was already a directory and was only adjusted
    pub existed: bool,
    /// Directories created by this call, outermost first
    pub created: Vec<PathBuf>,
    /// Pending resets in the order they were recorded; applied in reverse
    pub resets: Vec<PermissionReset>,
}

/// Creates or repairs a directory with exact permission and ownership semantics.
///
/// # Examples
///
/// ```rust,no_run
/// use fsguard::utils::fs::DirEnsurer;
///
/// let ok = DirEnsurer::new(0o755).ensure("/var/cache/pkg/distfiles".as_ref());
/// assert!(ok);
///
/// // Exact mode, owned by uid/gid 250
/// let ok = DirEnsurer::new(0o2775)
///     .with_owner(250)
///     .with_group(250)
///     .minimal(false)
///     .ensure("/var/cache/pkg".as_ref());
/// # let _ = ok;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEnsurer {
    uid: Option<u32>,
    gid: Option<u32>,
    mode: u32,
    minimal: bool,
}

impl DirEnsurer {
    /// Ensure directories with `mode`, keeping current ownership, in minimal mode.
    pub const fn new(mode: u32) -> Self {
        Self {
            uid: None,
            gid: None,
            mode,
            minimal: true,
        }
    }

    /// Chown to `uid`.
    #[must_use]
    pub const fn with_owner(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Chown to `gid`.
    #[must_use]
    pub const fn with_group(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    /// Set owner and group from optional ids; `None` leaves that id alone.
    #[must_use]
    pub const fn with_ids(mut self, uid: Option<u32>, gid: Option<u32>) -> Self {
        self.uid = uid;
        self.gid = gid;
        self
    }

    /// With `true` (the default) an existing directory only gains the requested
    /// bits; with `false` its mode is set to exactly the requested value.
    #[must_use]
    pub const fn minimal(mut self, minimal: bool) -> Self {
        self.minimal = minimal;
        self
    }

    /// The requested mode.
    pub const fn mode(&self) -> u32 {
        self.mode
    }

    /// Ensure `path` exists as a directory, returning `false` on any failure.
    ///
    /// `false` means the resulting state is indeterminate: some directories may
    /// have been created and permissions or ownership may be partially applied.
    /// The cause is logged at debug level; use [`DirEnsurer::try_ensure`] to
    /// inspect it.
    pub fn ensure(&self, path: &Path) -> bool {
        match self.try_ensure(path) {
            Ok(_) => true,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "ensure_dirs failed");
                false
            }
        }
    }

    /// Ensure `path` exists as a directory, reporting what was done.
    ///
    /// # Errors
    ///
    /// - [`FsError::NotADirectory`] when the target or an intermediate component
    ///   exists but is not a directory
    /// - whatever `stat`, `mkdir`, `chmod` or `chown` reported otherwise
    pub fn try_ensure(&self, path: &Path) -> Result<EnsureOutcome, FsError> {
        match DirEntryStat::stat(path) {
            Ok(st) if st.is_dir() => self.adjust_existing(path, &st),
            Ok(st) if st.exists() => Err(FsError::NotADirectory {
                path: path.to_path_buf(),
            }),
            // Absent, or unreadable: let the walk find the offending component
            _ => self.create_tree(path),
        }
    }

    fn adjust_existing(&self, path: &Path, st: &DirEntryStat) -> Result<EnsureOutcome, FsError> {
        let gid_differs = self.gid.is_some_and(|gid| gid != st.gid);
        let uid_differs = self.uid.is_some_and(|uid| uid != st.uid);
        if gid_differs || uid_differs {
            set_owner(path, self.uid, self.gid)?;
        }

        if self.minimal {
            if st.mode & self.mode != self.mode {
                set_mode(path, st.permissions() | self.mode)?;
            }
        } else if st.permissions() != self.mode {
            set_mode(path, self.mode)?;
        }

        Ok(EnsureOutcome {
            existed: true,
            ..EnsureOutcome::default()
        })
    }

    fn create_tree(&self, path: &Path) -> Result<EnsureOutcome, FsError> {
        // The empty path names the current directory
        let path = if path.as_os_str().is_empty() {
            Path::new(".")
        } else {
            path
        };
        let absolute = std::path::absolute(path)
            .map_err(|e| FsError::from_io(FsOperation::CurrentDir, path, e))?;
        let target = normalize_path(&absolute);

        let _umask = UmaskGuard::cleared();
        let mut outcome = EnsureOutcome::default();

        // The leaf is finished while every parent is still searchable; after the
        // drain a restored parent may deny the lookup
        let walked = self
            .walk(&target, &mut outcome)
            .and_then(|()| self.finish_leaf(&target, &outcome));
        let drained = drain_resets(&outcome.resets);
        walked?;
        drained?;

        Ok(outcome)
    }

    /// Apply ownership to the leaf, and fix the mode of a leaf created by this
    /// call when no reset is pending for it.
    fn finish_leaf(&self, target: &Path, outcome: &EnsureOutcome) -> Result<(), FsError> {
        if self.uid.is_some() || self.gid.is_some() {
            set_owner(target, self.uid, self.gid)?;
        }

        let created = outcome.created.last().is_some_and(|dir| dir == target);
        let reset_pending = outcome.resets.iter().any(|reset| reset.path == target);
        if created && !reset_pending && DirEntryStat::stat(target)?.permissions() != self.mode {
            set_mode(target, self.mode)?;
        }
        Ok(())
    }

    fn walk(&self, target: &Path, outcome: &mut EnsureOutcome) -> Result<(), FsError> {
        // New directories need owner rwx until their children exist
        let force_temp_perms = self.mode & OWNER_RWX != OWNER_RWX;
        let has_ids = self.uid.is_some() || self.gid.is_some();
        let mut sticky_parent = false;
        let mut current = PathBuf::new();
        let mut components = target.components().peekable();

        while let Some(component) = components.next() {
            current.push(component);
            let is_leaf = components.peek().is_none();
            let st = DirEntryStat::stat(&current)?;

            if st.exists() {
                if !st.is_dir() {
                    return Err(FsError::NotADirectory { path: current });
                }
                if !is_leaf {
                    if !st.owner_has_rwx() {
                        set_mode(&current, st.permissions() | OWNER_RWX)?;
                        outcome.resets.push(PermissionReset::new(&current, st.permissions()));
                    }
                    sticky_parent = st.has_setgid();
                }
                continue;
            }

            if force_temp_perms {
                make_dir(&current, OWNER_RWX, outcome)?;
                outcome.resets.push(PermissionReset::new(&current, self.mode));
            } else {
                make_dir(&current, self.mode, outcome)?;
                if is_leaf && sticky_parent {
                    outcome.resets.push(PermissionReset::new(&current, self.mode));
                }
            }

            if has_ids && !is_leaf {
                set_owner(&current, self.uid, self.gid)?;
            }
        }

        Ok(())
    }
}

impl Default for DirEnsurer {
    fn default() -> Self {
        Self::new(0o777)
    }
}

/// Ensure `path` is a directory with at least `mode`, keeping ownership.
///
/// Shorthand for `DirEnsurer::new(mode).ensure(path)`.
pub fn ensure_dirs(path: &Path, mode: u32) -> bool {
    DirEnsurer::new(mode).ensure(path)
}

/// Ensures a directory exists with at least `mode`, creating missing parents.
///
/// Same algorithm as [`ensure_dirs`], but failures carry the cause and a hint
/// instead of collapsing to `false`.
///
/// # Examples
///
/// ```rust,no_run
/// use fsguard::utils::fs::ensure_dir;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// ensure_dir(Path::new("output/distfiles"), 0o755)?;
/// # Ok(())
/// # }
/// ```
pub fn ensure_dir(path: &Path, mode: u32) -> anyhow::Result<()> {
    DirEnsurer::new(mode).try_ensure(path).map(|_| ()).with_context(|| {
        format!(
            "Failed to ensure directory: {}\n\nCheck directory permissions and that no component is a regular file",
            path.display()
        )
    })
}

/// Apply every reset, deepest first, reporting the first failure.
fn drain_resets(resets: &[PermissionReset]) -> Result<(), FsError> {
    let mut first_error = None;
    for reset in resets.iter().rev() {
        if let Err(e) = set_mode(&reset.path, reset.mode) {
            first_error.get_or_insert(e);
        }
    }
    first_error.map_or(Ok(()), Err)
}

fn make_dir(path: &Path, mode: u32, outcome: &mut EnsureOutcome) -> Result<(), FsError> {
    match DirBuilder::new().mode(mode).create(path) {
        Ok(()) => {
            trace!(path = %path.display(), mode = format_args!("{mode:o}"), "created directory");
            outcome.created.push(path.to_path_buf());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
            // Lost a race; fine as long as the winner made a directory
            if DirEntryStat::stat(path)?.is_dir() {
                Ok(())
            } else {
                Err(FsError::NotADirectory {
                    path: path.to_path_buf(),
                })
            }
        }
        Err(e) => Err(FsError::from_io(FsOperation::CreateDir, path, e)),
    }
}

fn set_mode(path: &Path, mode: u32) -> Result<(), FsError> {
    fs::set_permissions(path, Permissions::from_mode(mode))
        .map_err(|e| FsError::from_io(FsOperation::SetPermissions, path, e))
}

fn set_owner(path: &Path, uid: Option<u32>, gid: Option<u32>) -> Result<(), FsError> {
    std::os::unix::fs::chown(path, uid, gid).map_err(|e| FsError::from_io(FsOperation::SetOwner, path, e))
}
