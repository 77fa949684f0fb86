//! Global configuration for fsguard.
//!
//! # Location
//!
//! - `$FSGUARD_CONFIG` when set
//! - otherwise `<config dir>/fsguard/config.toml`, e.g.
//!   `~/.config/fsguard/config.toml` on Linux and
//!   `~/Library/Application Support/fsguard/config.toml` on macOS
//!
//! A missing file is not an error: every field has a default.
//!
//! # File Format
//!
//! ```toml
//! # Mode for `ensure-dir` when --mode is not given
//! default_dir_mode = 0o755
//! # Only add bits to existing directories
//! minimal = true
//! # auto | native | fallback
//! access_strategy = "auto"
//!
//! [lock]
//! # Give up polling after this long; blocking acquisition when unset
//! timeout_ms = 30000
//! # Longest pause between polling attempts
//! max_backoff_ms = 500
//! ```

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_DIR_MODE, MAX_BACKOFF_DELAY_MS};
use crate::utils::fs::AccessStrategy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Which access check implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStrategySetting {
    /// Let the platform decide
    #[default]
    Auto,
    /// Always ask the kernel
    Native,
    /// Always compute from metadata
    Fallback,
}

impl AccessStrategySetting {
    /// The concrete strategy this setting stands for on this platform.
    pub const fn resolve(self) -> AccessStrategy {
        match self {
            AccessStrategySetting::Auto => AccessStrategy::detect(),
            AccessStrategySetting::Native => AccessStrategy::Native,
            AccessStrategySetting::Fallback => AccessStrategy::Fallback,
        }
    }
}

/// Settings for the `lock` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Polling budget; `None` waits indefinitely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Cap on the delay between polling attempts.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl LockConfig {
    /// The polling budget as a [`Duration`].
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// The backoff cap as a [`Duration`].
    pub const fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout_ms: None,
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

const fn default_max_backoff_ms() -> u64 {
    MAX_BACKOFF_DELAY_MS
}

const fn default_dir_mode() -> u32 {
    DEFAULT_DIR_MODE
}

const fn default_minimal() -> bool {
    true
}

/// User-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Mode applied by `ensure-dir` when none is given.
    #[serde(default = "default_dir_mode")]
    pub default_dir_mode: u32,

    /// Whether `ensure-dir` only adds bits to existing directories.
    #[serde(default = "default_minimal")]
    pub minimal: bool,

    /// Access check implementation.
    #[serde(default)]
    pub access_strategy: AccessStrategySetting,

    /// Lock polling settings.
    #[serde(default)]
    pub lock: LockConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_dir_mode: default_dir_mode(),
            minimal: default_minimal(),
            access_strategy: AccessStrategySetting::default(),
            lock: LockConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Load from the default location, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read, parsed, or validated.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load from `path` when given, otherwise from the default location.
    ///
    /// # Errors
    ///
    /// The file exists but cannot be read, parsed, or validated.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => match Self::default_path() {
                Ok(path) => path,
                Err(e) => {
                    tracing::debug!(error = %e, "No config location; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if fs::try_exists(&path).await.unwrap_or(false) {
            Self::load_from(&path).await
        } else {
            tracing::trace!(path = %path.display(), "Config file absent; using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// The file cannot be read, is not valid TOML, or holds invalid values.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        Ok(config)
    }

    /// Check values serde cannot.
    ///
    /// # Errors
    ///
    /// `default_dir_mode` has bits outside `0o7777`, or `[lock] max_backoff_ms`
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        if self.default_dir_mode & !0o7777 != 0 {
            anyhow::bail!(
                "default_dir_mode {:#o} has bits outside 0o7777",
                self.default_dir_mode
            );
        }
        // A zero cap would poll without pausing
        if self.lock.max_backoff_ms == 0 {
            anyhow::bail!("[lock] max_backoff_ms must be at least 1");
        }
        Ok(())
    }

    /// Where the configuration lives.
    ///
    /// # Errors
    ///
    /// No override is set and the platform has no config directory.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine config directory"))?;
        Ok(config_dir.join("fsguard").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GlobalConfig::default();
        assert_eq!(config.default_dir_mode, 0o755);
        assert!(config.minimal);
        assert_eq!(config.access_strategy, AccessStrategySetting::Auto);
        assert_eq!(config.lock.timeout(), None);
        assert_eq!(config.lock.max_backoff(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_full() {
        let config: GlobalConfig = toml::from_str(
            r#"
            default_dir_mode = 0o2775
            minimal = false
            access_strategy = "fallback"

            [lock]
            timeout_ms = 250
            max_backoff_ms = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.default_dir_mode, 0o2775);
        assert!(!config.minimal);
        assert_eq!(config.access_strategy.resolve(), AccessStrategy::Fallback);
        assert_eq!(config.lock.timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.lock.max_backoff_ms, 50);
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(toml::from_str::<GlobalConfig>(r#"access_strategy = "magic""#).is_err());
    }

    #[tokio::test]
    async fn test_load_missing_file_gives_defaults() {
        let temp = tempdir().unwrap();
        let config = GlobalConfig::load_with_optional(Some(temp.path().join("none.toml")))
            .await
            .unwrap();
        assert_eq!(config, GlobalConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_dir_mode = 0o700\n").unwrap();

        let config = GlobalConfig::load_with_optional(Some(path)).await.unwrap();
        assert_eq!(config.default_dir_mode, 0o700);
        assert!(config.minimal);
    }

    #[tokio::test]
    async fn test_load_rejects_bad_mode() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "default_dir_mode = 0o17777\n").unwrap();

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("outside 0o7777"));
    }

    #[tokio::test]
    async fn test_load_rejects_zero_backoff() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[lock]\ntimeout_ms = 1000\nmax_backoff_ms = 0\n").unwrap();

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("max_backoff_ms must be at least 1"));

        std::fs::write(&path, "[lock]\nmax_backoff_ms = 1\n").unwrap();
        assert_eq!(
            GlobalConfig::load_from(&path).await.unwrap().lock.max_backoff(),
            Duration::from_millis(1)
        );
    }

    #[tokio::test]
    async fn test_load_reports_syntax_errors() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "minimal = maybe\n").unwrap();

        let err = GlobalConfig::load_from(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        assert!(err.chain().any(|cause| cause.downcast_ref::<toml::de::Error>().is_some()));
    }
}
