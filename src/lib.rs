//! fsguard - filesystem guard utilities
//!
//! Building blocks for tools such as package managers that have to create
//! directory trees with exact permissions, coordinate concurrent processes
//! through advisory locks, and reason about paths and access rights.
//!
//! # Core Modules
//!
//! - [`utils::fs`] - path canonicalization, access checks, directory
//!   provisioning, and thin readers
//! - [`lock`] - advisory read/write file locks, with async helpers in
//!   [`lock::scoped`]
//! - [`core`] - error types and user-facing error rendering
//!
//! ## Supporting Modules
//! - [`config`] - global TOML configuration used by the command-line front-end
//! - [`cli`] - the `fsguard` command-line interface
//! - [`constants`] - shared defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use fsguard::lock::FsLock;
//! use fsguard::utils::fs::{AccessMode, DirEnsurer, access};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let distdir = Path::new("/var/cache/distfiles");
//! if !DirEnsurer::new(0o2775).with_group(250).ensure(distdir) {
//!     anyhow::bail!("cannot prepare {}", distdir.display());
//! }
//!
//! let mut lock = FsLock::new(distdir, false)?;
//! lock.acquire_write_lock(true)?;
//! assert!(access(distdir, AccessMode::WRITE));
//! # Ok(())
//! # }
//! ```
//!
//! # Platform Support
//!
//! Unix only: permission bits, ownership, the umask, and `flock(2)` have no
//! portable equivalent elsewhere.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod lock;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
