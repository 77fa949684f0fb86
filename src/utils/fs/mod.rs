//! Filesystem primitives for Unix hosts
//!
//! This module holds the building blocks the rest of the crate is made of:
//! path canonicalization, `access(2)` emulation, permission-aware directory
//! provisioning, and a few thin readers.
//!
//! # Key Features
//!
//! - **Lexical paths**: [`normalize_path`] and [`join_path`] never touch the filesystem
//! - **One-level symlinks**: [`resolve_absolute_path`] follows exactly one link
//! - **Exact modes**: [`DirEnsurer`] applies modes with the umask cleared and
//!   restores any permission it had to loosen on the way
//! - **Reliable access checks**: [`access`] falls back to a metadata-based
//!   decision where the kernel over-grants execute to root
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsguard::utils::fs::{AccessMode, DirEnsurer, access, normalize_path};
//! use std::path::Path;
//!
//! let dir = normalize_path(Path::new("/var/tmp//pkg/./build"));
//! if DirEnsurer::new(0o755).ensure(&dir) && access(&dir, AccessMode::WRITE) {
//!     println!("ready: {}", dir.display());
//! }
//! ```
//!
//! # Platform Considerations
//!
//! Unix only. Permission bits, ownership and the umask have no Windows
//! equivalent. On Solaris and illumos [`access`] uses [`fallback_access`].

pub mod access;
pub mod dirs;
pub mod listing;
pub mod paths;
pub mod read;
pub mod stat;
pub mod umask;

// Path canonicalization
pub use paths::{join_path, normalize_path, resolve_absolute_path, resolve_symlink_once};

// Access checks
pub use access::{
    AccessChecker, AccessMode, AccessStrategy, access, check_access, fallback_access,
    native_access,
};

// Directory provisioning
pub use dirs::{DirEnsurer, EnsureOutcome, PermissionReset, ensure_dir, ensure_dirs};

// Readers
pub use read::{
    Lines, OnMissing, ReadLinesOptions, TextEncoding, read_file, read_file_bytes, read_lines,
    unlink_if_exists,
};

// Listing
pub use listing::{list_dir, list_dir_dirs, list_dir_files};

// Snapshots
pub use stat::{DirEntryStat, EntryKind};
pub use umask::UmaskGuard;
