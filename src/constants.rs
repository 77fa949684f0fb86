//! Global constants used throughout the fsguard codebase.
//!
//! Modes, retry parameters, and environment variable names shared by the
//! library and the command-line front-end.

/// Mode used by `ensure-dir` when neither the command line nor the config
/// file give one.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV_VAR: &str = "FSGUARD_CONFIG";

/// Maximum backoff delay for exponential backoff (500ms).
///
/// Exponential backoff delays are capped at this value to prevent
/// excessive wait times while polling for a lock.
pub const MAX_BACKOFF_DELAY_MS: u64 = 500;

/// Starting delay for exponential backoff (10ms).
///
/// This is the initial delay used in exponential backoff calculations,
/// which doubles on each retry attempt.
pub const STARTING_BACKOFF_DELAY_MS: u64 = 10;

/// Exit status of `fsguard lock` when a non-blocking acquisition is refused
/// (`EX_TEMPFAIL`).
pub const EXIT_LOCK_BUSY: i32 = 75;
