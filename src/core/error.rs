//! Error handling for fsguard
//!
//! The library reports failures through two strongly-typed enums:
//!
//! - [`FsError`] - path canonicalization, directory provisioning, and the
//!   file readers. Every variant carries the path it concerns; OS failures keep
//!   the originating [`std::io::Error`] so the raw errno stays available.
//! - [`LockError`] - the advisory lock in [`crate::lock`].
//!
//! Non-blocking lock contention is *not* an error: the lock operations return
//! `Ok(false)` for it.
//!
//! At the CLI boundary errors travel as [`anyhow::Error`] and are rendered by
//! [`user_friendly_error`] into an [`ErrorContext`] with a coloured message and a
//! suggestion.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsguard::core::{FsError, user_friendly_error};
//! use fsguard::utils::fs::resolve_symlink_once;
//! use std::path::Path;
//!
//! match resolve_symlink_once(Path::new("/etc/localtime")) {
//!     Ok(target) => println!("{}", target.display()),
//!     Err(FsError::NotASymlink { path }) => println!("{} is a plain file", path.display()),
//!     Err(e) => user_friendly_error(e.into()).display(),
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The filesystem operation that was being attempted when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOperation {
    /// stat/lstat of a path
    Stat,
    /// mkdir of a single segment
    CreateDir,
    /// chmod
    SetPermissions,
    /// chown
    SetOwner,
    /// readlink
    ReadLink,
    /// resolving the current working directory
    CurrentDir,
    /// opening or reading a file
    Read,
    /// listing a directory
    ListDir,
    /// unlinking a file
    Remove,
    /// changing the process umask
    Umask,
}

impl fmt::Display for FsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FsOperation::Stat => "stat",
            FsOperation::CreateDir => "mkdir",
            FsOperation::SetPermissions => "chmod",
            FsOperation::SetOwner => "chown",
            FsOperation::ReadLink => "readlink",
            FsOperation::CurrentDir => "getcwd",
            FsOperation::Read => "read",
            FsOperation::ListDir => "listdir",
            FsOperation::Remove => "unlink",
            FsOperation::Umask => "umask",
        };
        f.write_str(name)
    }
}

/// Errors raised by the path, directory, and reader utilities.
///
/// The variant is chosen from the [`io::ErrorKind`] (and errno where the kind is
/// ambiguous) by [`FsError::from_io`]; anything without a dedicated variant ends
/// up in [`FsError::Io`], which is the generic failure case.
#[derive(Error, Debug)]
pub enum FsError {
    /// The path, or a component of it, does not exist.
    #[error("No such file or directory: {}", .path.display())]
    NotFound {
        /// Path that was missing
        path: PathBuf,
    },

    /// A component that must be a directory is something else.
    #[error("Not a directory: {}", .path.display())]
    NotADirectory {
        /// Offending component
        path: PathBuf,
    },

    /// A symlink was required but the path is a different kind of entry.
    #[error("Not a symlink: {}", .path.display())]
    NotASymlink {
        /// Path that was read
        path: PathBuf,
    },

    /// The OS refused the operation.
    #[error("Permission denied during {operation} of {}", .path.display())]
    PermissionDenied {
        /// The operation that was refused
        operation: FsOperation,
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// File contents could not be decoded with the requested encoding.
    #[error("Invalid {encoding} data in {}: {reason}", .path.display())]
    InvalidEncoding {
        /// File that was read
        path: PathBuf,
        /// Encoding that was requested
        encoding: &'static str,
        /// Decoder message
        reason: String,
    },

    /// Any other OS-level failure.
    #[error("{operation} failed for {}: {source}", .path.display())]
    Io {
        /// The operation that failed
        operation: FsOperation,
        /// Path the operation targeted
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

impl FsError {
    /// Classify an [`io::Error`] raised while performing `operation` on `path`.
    ///
    /// `EINVAL` from `readlink` means "not a symlink", so that case is mapped to
    /// [`FsError::NotASymlink`]. `ENOTDIR` maps to [`FsError::NotADirectory`].
    pub fn from_io(operation: FsOperation, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied {
                operation,
                path,
                source,
            },
            io::ErrorKind::InvalidInput if operation == FsOperation::ReadLink => {
                FsError::NotASymlink { path }
            }
            _ if source.raw_os_error() == Some(nix::libc::ENOTDIR) => {
                FsError::NotADirectory { path }
            }
            _ => FsError::Io {
                operation,
                path,
                source,
            },
        }
    }

    /// The path this error concerns.
    pub fn path(&self) -> &Path {
        match self {
            FsError::NotFound { path }
            | FsError::NotADirectory { path }
            | FsError::NotASymlink { path }
            | FsError::PermissionDenied { path, .. }
            | FsError::InvalidEncoding { path, .. }
            | FsError::Io { path, .. } => path,
        }
    }

    /// The originating OS error code, when one was captured.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            FsError::PermissionDenied { source, .. } | FsError::Io { source, .. } => {
                source.raw_os_error()
            }
            FsError::NotFound { .. } => Some(nix::libc::ENOENT),
            FsError::NotADirectory { .. } => Some(nix::libc::ENOTDIR),
            FsError::NotASymlink { .. } => Some(nix::libc::EINVAL),
            FsError::InvalidEncoding { .. } => None,
        }
    }

    /// Whether this is the "absent" condition.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

/// Errors raised by [`crate::lock::FsLock`].
///
/// Non-blocking contention is reported as `Ok(false)` by the acquire calls and
/// never shows up here.
#[derive(Error, Debug)]
pub enum LockError {
    /// The lock target does not exist and was not allowed to be created.
    #[error("Lock action for '{}' failed due to not being a valid dir/file{}", .path.display(), reason_suffix(.reason.as_ref()))]
    NonExistant {
        /// Lock target
        path: PathBuf,
        /// Why opening failed, when an open was attempted
        #[source]
        reason: Option<io::Error>,
    },

    /// Permission problems, I/O errors, and anything else the OS reports.
    #[error("Lock action for '{}' failed due to '{source}'", .path.display())]
    GenericFailed {
        /// Lock target
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },

    /// A bounded acquisition gave up.
    #[error("Timeout acquiring lock on '{}' after {timeout:?}", .path.display())]
    Timeout {
        /// Lock target
        path: PathBuf,
        /// Budget that was exhausted
        timeout: std::time::Duration,
    },
}

fn reason_suffix(reason: Option<&io::Error>) -> String {
    reason.map(|r| format!(" ({r})")).unwrap_or_default()
}

impl LockError {
    /// The lock target this error concerns.
    pub fn path(&self) -> &Path {
        match self {
            LockError::NonExistant { path, .. }
            | LockError::GenericFailed { path, .. }
            | LockError::Timeout { path, .. } => path,
        }
    }

    /// The originating OS error code, when one was captured.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            LockError::NonExistant { reason, .. } => reason.as_ref().and_then(io::Error::raw_os_error),
            LockError::GenericFailed { source, .. } => source.raw_os_error(),
            LockError::Timeout { .. } => None,
        }
    }
}

/// An error with a suggestion and details for display in the terminal.
#[derive(Debug)]
pub struct ErrorContext {
    /// The rendered error message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: Red and bold
    /// - Details: Yellow
    /// - Suggestion: Green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The error chain is searched for [`FsError`], [`LockError`], [`std::io::Error`],
/// and [`toml::de::Error`]; the first match decides the suggestion. The message is
/// always the full `anyhow` chain so no context is lost.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    for cause in error.chain() {
        if let Some(fs_error) = cause.downcast_ref::<FsError>() {
            return fs_error_context(message, fs_error);
        }

        if let Some(lock_error) = cause.downcast_ref::<LockError>() {
            return lock_error_context(message, lock_error);
        }

        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::PermissionDenied => {
                    return ErrorContext::new(message)
                        .with_suggestion("Check file ownership or re-run with sufficient privileges");
                }
                io::ErrorKind::NotFound => {
                    return ErrorContext::new(message)
                        .with_suggestion("Check that the file or directory exists and the path is correct");
                }
                _ => {}
            }
        }

        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return ErrorContext::new(message)
                .with_suggestion("Check the TOML syntax of the configuration file")
                .with_details("Modes may be written as octal integers, e.g. default_dir_mode = 0o755");
        }
    }

    ErrorContext::new(message)
}

fn fs_error_context(message: String, error: &FsError) -> ErrorContext {
    match error {
        FsError::NotFound { path } => ErrorContext::new(message)
            .with_suggestion(format!("Create {} first or check the spelling", path.display())),
        FsError::NotADirectory { path } => ErrorContext::new(message)
            .with_suggestion(format!("Remove or rename the non-directory entry at {}", path.display()))
            .with_details("Every intermediate path component must be a directory"),
        FsError::NotASymlink { .. } => ErrorContext::new(message),
        FsError::PermissionDenied { path, .. } => ErrorContext::new(message)
            .with_suggestion(format!("Check the permissions and ownership of {}", path.display())),
        FsError::InvalidEncoding { .. } => ErrorContext::new(message)
            .with_suggestion("Read the file with --encoding bytes or a lenient encoding"),
        FsError::Io { source, .. } => {
            ErrorContext::new(message).with_details(format!("OS error: {source}"))
        }
    }
}

fn lock_error_context(message: String, error: &LockError) -> ErrorContext {
    match error {
        LockError::NonExistant { .. } => ErrorContext::new(message)
            .with_suggestion("Pass --create to create the lock file, or create it beforehand")
            .with_details("The parent directory of a lock file is never created automatically"),
        LockError::GenericFailed { .. } => ErrorContext::new(message)
            .with_suggestion("Check that the lock file's directory is writable and on a local filesystem"),
        LockError::Timeout { .. } => ErrorContext::new(message)
            .with_suggestion("Another process is holding the lock; retry later or raise the timeout"),
    }
}
