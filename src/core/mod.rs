//! Core types for fsguard
//!
//! This module holds the error taxonomy shared by every other module:
//!
//! - [`FsError`] - failures of the path, directory, and reader utilities
//! - [`LockError`] - failures of [`crate::lock::FsLock`]
//! - [`ErrorContext`] / [`user_friendly_error`] - CLI-facing rendering with suggestions
//!
//! # Error Propagation
//!
//! Library operations return typed errors carrying the path and the originating
//! OS error. The single exception is [`crate::utils::fs::DirEnsurer::ensure`], which
//! folds every failure into `false`; use
//! [`crate::utils::fs::DirEnsurer::try_ensure`] when the cause matters.
//!
//! # Examples
//!
//! ```rust,no_run
//! use fsguard::core::{LockError, user_friendly_error};
//! use fsguard::lock::FsLock;
//!
//! match FsLock::new("/var/lock/pkg.lock", false) {
//!     Ok(_lock) => {}
//!     Err(e @ LockError::NonExistant { .. }) => user_friendly_error(e.into()).display(),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```

pub mod error;

pub use error::{ErrorContext, FsError, FsOperation, LockError, user_friendly_error};
