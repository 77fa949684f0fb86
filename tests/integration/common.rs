//! Helpers shared by the integration tests.

use assert_cmd::Command;
use std::path::Path;
use std::time::{Duration, Instant};

/// `fsguard` with its configuration pointed at a file inside `root`.
///
/// The file does not have to exist; a missing config means defaults, so the
/// user's own configuration never leaks into a test.
pub fn fsguard(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fsguard").unwrap();
    cmd.env("FSGUARD_CONFIG", root.join("fsguard-test-config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

/// Path to the built `fsguard` binary, for spawning long-running children.
pub fn fsguard_bin() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin("fsguard")
}

/// Poll `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

/// uid and gid of `nobody`.
const NOBODY: u32 = 65534;

/// `fsguard` running as an ordinary user.
///
/// Root searches every directory regardless of its mode, so under root the
/// binary is copied into `root` and started as `nobody`, with `root` opened up
/// for that user. Otherwise it runs as the current user.
pub fn fsguard_unprivileged(root: &Path) -> std::process::Command {
    use std::os::unix::process::CommandExt;

    let mut cmd = if nix::unistd::Uid::effective().is_root() {
        let copy = root.join("fsguard-unprivileged");
        std::fs::copy(fsguard_bin(), &copy).unwrap();
        fsguard::test_utils::set_mode(&copy, 0o755);
        fsguard::test_utils::set_mode(root, 0o777);
        let mut cmd = std::process::Command::new(copy);
        cmd.uid(NOBODY).gid(NOBODY);
        cmd
    } else {
        std::process::Command::new(fsguard_bin())
    };
    cmd.env("FSGUARD_CONFIG", root.join("fsguard-test-config.toml"))
        .env_remove("RUST_LOG");
    cmd
}

/// Run `cmd` to completion, retrying while the freshly copied binary is still
/// held open for writing by a concurrently forked child (`ETXTBSY`).
pub fn run_to_completion(cmd: &mut std::process::Command) -> std::process::Output {
    let mut attempts = 0;
    loop {
        match cmd.output() {
            Err(e) if e.raw_os_error() == Some(nix::libc::ETXTBSY) && attempts < 10 => {
                attempts += 1;
                std::thread::sleep(Duration::from_millis(50));
            }
            result => return result.unwrap(),
        }
    }
}
