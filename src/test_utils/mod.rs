//! Test utilities for fsguard
//!
//! Helpers shared by unit tests and the integration suite (enable the
//! `test-utils` feature to use them from `tests/`).
//!
//! # Example
//!
//! ```rust,no_run
//! use fsguard::test_utils::{init_test_logging, mode_of, set_mode};
//!
//! init_test_logging(None);
//! let dir = tempfile::tempdir().unwrap();
//! set_mode(dir.path(), 0o750);
//! assert_eq!(mode_of(dir.path()), 0o750);
//! ```

use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` that level is used;
/// otherwise `RUST_LOG` decides, and without it nothing is logged.
///
/// ```bash
/// RUST_LOG=fsguard=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Permission bits (`& 0o7777`) of `path`, following symlinks.
///
/// # Panics
///
/// If `path` cannot be stat'ed.
pub fn mode_of(path: &Path) -> u32 {
    std::fs::metadata(path)
        .unwrap_or_else(|e| panic!("stat {}: {e}", path.display()))
        .permissions()
        .mode()
        & 0o7777
}

/// chmod `path` to `mode`.
///
/// # Panics
///
/// If the chmod fails.
pub fn set_mode(path: &Path, mode: u32) {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .unwrap_or_else(|e| panic!("chmod {:o} {}: {e}", mode, path.display()));
}
