//! Utilities shared across fsguard
//!
//! - [`fs`] - filesystem primitives: paths, access checks, directory
//!   provisioning, readers, and listing

pub mod fs;

pub use fs::{DirEnsurer, ensure_dirs, join_path, normalize_path, resolve_absolute_path};
