//! Integration test suite for fsguard
//!
//! End-to-end tests that drive the `fsguard` binary and check its effect on a
//! temporary directory tree.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **access_cmd**: `access` answers and exit codes
//! - **config_file**: configuration discovery and overrides
//! - **ensure_dir_cmd**: directory provisioning through the CLI
//! - **locking**: cross-process advisory locking
//! - **paths_cmd**: `normalize`, `join`, `abspath`
//! - **read_cmd**: `read` encodings and missing-file handling

mod common;

mod access_cmd;
mod config_file;
mod ensure_dir_cmd;
mod locking;
mod paths_cmd;
mod read_cmd;
