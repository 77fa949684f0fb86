//! Scoped override of the process umask.
//!
//! The umask is process-wide state. While a [`UmaskGuard`] is alive every
//! thread in the process creates files and directories with the overridden
//! mask, so unrelated creation calls racing with the guard may produce
//! unexpected permissions. Callers that cannot tolerate this must serialize
//! their filesystem work themselves.

use nix::sys::stat::{Mode, umask};

/// Sets the umask on construction and restores the previous value on drop.
#[derive(Debug)]
pub struct UmaskGuard {
    previous: Mode,
}

impl UmaskGuard {
    /// Force the umask to `0` until the guard is dropped.
    pub fn cleared() -> Self {
        Self::set(0)
    }

    /// Set the umask to `mask` until the guard is dropped.
    pub fn set(mask: u32) -> Self {
        let previous = umask(Mode::from_bits_truncate(mask as nix::libc::mode_t));
        tracing::trace!(previous = format_args!("{:o}", previous.bits()), mask = format_args!("{mask:o}"), "umask overridden");
        Self { previous }
    }

    /// The umask that will be restored.
    pub fn previous(&self) -> u32 {
        u32::from(self.previous.bits())
    }
}

impl Drop for UmaskGuard {
    fn drop(&mut self) {
        umask(self.previous);
    }
}
