//! POSIX `access(2)` with a userspace fallback.
//!
//! Some platforms report `X_OK` as granted to privileged processes even when no
//! execute bit is set anywhere. On those platforms the decision is computed from
//! `lstat` metadata by [`check_access`] instead of asking the kernel. The choice
//! is made once per process ([`AccessStrategy::detect`], optionally overridden by
//! configuration) and never per call.

use super::stat::DirEntryStat;
use nix::unistd::{AccessFlags, Gid, Uid};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};
use std::path::Path;
use std::sync::OnceLock;

/// Requested access bits, numerically identical to `F_OK`/`X_OK`/`W_OK`/`R_OK`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AccessMode(u32);

impl AccessMode {
    /// Existence only
    pub const EXISTS: Self = Self(0);
    /// Execute (search for directories)
    pub const EXECUTE: Self = Self(1);
    /// Write
    pub const WRITE: Self = Self(2);
    /// Read
    pub const READ: Self = Self(4);

    /// Build from raw bits; anything above the low three bits is discarded.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits & 0o7)
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every bit of `other` is requested.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether only existence is requested.
    pub const fn is_exists_only(self) -> bool {
        self.0 == 0
    }

    fn to_flags(self) -> AccessFlags {
        let mut flags = AccessFlags::F_OK;
        if self.contains(Self::READ) {
            flags |= AccessFlags::R_OK;
        }
        if self.contains(Self::WRITE) {
            flags |= AccessFlags::W_OK;
        }
        if self.contains(Self::EXECUTE) {
            flags |= AccessFlags::X_OK;
        }
        flags
    }
}

impl BitOr for AccessMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AccessMode {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Decide whether `uid` with group membership `gids` may perform `requested` on
/// an entry described by `stat`.
///
/// Rules, in order:
/// - existence-only requests are always granted
/// - `uid == 0`: execute is granted iff any execute bit is set, read/write always
/// - owner: the owner triplet must contain every requested bit
/// - group member: the group triplet decides
/// - everyone else: the other triplet decides
///
/// The triplets are mutually exclusive: an owner lacking a bit is refused even if
/// the group or other triplet would grant it.
pub fn check_access(stat: &DirEntryStat, requested: AccessMode, uid: u32, gids: &[u32]) -> bool {
    let wanted = requested.bits();
    if wanted == 0 {
        return true;
    }

    if uid == 0 {
        if wanted & AccessMode::EXECUTE.bits() == 0 {
            return true;
        }
        return stat.mode & 0o111 != 0;
    }

    let triplet = if uid == stat.uid {
        (stat.mode >> 6) & 0o7
    } else if gids.contains(&stat.gid) {
        (stat.mode >> 3) & 0o7
    } else {
        stat.mode & 0o7
    };

    wanted & triplet == wanted
}

/// How [`access`] answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStrategy {
    /// Ask the kernel via `access(2)`
    Native,
    /// Compute the answer from `lstat` metadata with [`check_access`]
    Fallback,
}

impl AccessStrategy {
    /// The strategy appropriate for the platform this binary was built for.
    ///
    /// Solaris and illumos grant `X_OK` to root unconditionally, so they use the
    /// fallback; everything else trusts the kernel.
    pub const fn detect() -> Self {
        if cfg!(any(target_os = "solaris", target_os = "illumos")) {
            AccessStrategy::Fallback
        } else {
            AccessStrategy::Native
        }
    }
}

static PROCESS_STRATEGY: OnceLock<AccessStrategy> = OnceLock::new();

/// Pin the strategy used by [`access`] for the rest of the process.
///
/// Only the first call has any effect; it returns `false` when a strategy had
/// already been selected (explicitly or by a prior [`access`] call).
pub fn select_process_strategy(strategy: AccessStrategy) -> bool {
    PROCESS_STRATEGY.set(strategy).is_ok()
}

/// The strategy [`access`] uses, detecting it on first use.
pub fn process_strategy() -> AccessStrategy {
    *PROCESS_STRATEGY.get_or_init(AccessStrategy::detect)
}

/// Access checks bound to one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessChecker {
    strategy: AccessStrategy,
}

impl AccessChecker {
    /// A checker using `strategy`.
    pub const fn new(strategy: AccessStrategy) -> Self {
        Self { strategy }
    }

    /// The strategy in use.
    pub const fn strategy(&self) -> AccessStrategy {
        self.strategy
    }

    /// Whether the calling process may access `path` with `mode`.
    ///
    /// Never fails: any error while probing counts as "no access".
    pub fn access(&self, path: &Path, mode: AccessMode) -> bool {
        match self.strategy {
            AccessStrategy::Native => native_access(path, mode),
            AccessStrategy::Fallback => fallback_access(path, mode),
        }
    }
}

impl Default for AccessChecker {
    fn default() -> Self {
        Self::new(process_strategy())
    }
}

/// Whether the calling process may access `path` with `mode`, using the
/// process-wide strategy.
pub fn access(path: &Path, mode: AccessMode) -> bool {
    AccessChecker::default().access(path, mode)
}

/// `access(2)` as reported by the kernel.
pub fn native_access(path: &Path, mode: AccessMode) -> bool {
    nix::unistd::access(path, mode.to_flags()).is_ok()
}

/// Userspace emulation of `access(2)` for the real uid and groups.
///
/// The path is `lstat`ed, so a trailing symlink is judged by the link itself.
/// Returns `false` when the path cannot be examined.
pub fn fallback_access(path: &Path, mode: AccessMode) -> bool {
    let stat = match DirEntryStat::lstat(path) {
        Ok(stat) if stat.exists() => stat,
        Ok(_) => return false,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "fallback access probe failed");
            return false;
        }
    };

    if mode.is_exists_only() {
        return true;
    }

    check_access(&stat, mode, Uid::current().as_raw(), &process_groups())
}

/// Real gid plus supplementary groups of the calling process.
fn process_groups() -> Vec<u32> {
    let mut groups = vec![Gid::current().as_raw()];

    #[cfg(not(any(target_os = "macos", target_os = "ios")))]
    match nix::unistd::getgroups() {
        Ok(supplementary) => groups.extend(supplementary.into_iter().map(Gid::as_raw)),
        Err(e) => tracing::debug!(error = %e, "getgroups failed; using primary group only"),
    }

    groups
}
