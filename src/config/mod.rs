//! Configuration management for fsguard
//!
//! fsguard has a single, optional, user-wide TOML file holding defaults for the
//! command-line front-end. Library callers pass every setting explicitly and
//! never read it.
//!
//! # Modules
//!
//! - `global` - loading, defaults, and validation of the global file
//!
//! # Precedence
//!
//! Command-line flags override the file, and the file overrides built-in
//! defaults. `--config` overrides the file location.

pub mod global;

pub use global::{AccessStrategySetting, GlobalConfig, LockConfig};
