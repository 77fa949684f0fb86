//! Cross-process locking through the `lock` command.

use crate::common::{fsguard, fsguard_bin, wait_until};
use fsguard::lock::FsLock;
use predicates::prelude::*;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;

/// Start `fsguard lock` holding `path` around a long sleep.
fn hold(root: &Path, path: &Path, shared: bool) -> Child {
    let mut cmd = Command::new(fsguard_bin());
    cmd.env("FSGUARD_CONFIG", root.join("fsguard-test-config.toml"))
        .arg("lock")
        .arg("--create");
    if shared {
        cmd.arg("--shared");
    }
    let child = cmd
        .arg(path)
        .args(["--", "sleep", "30"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut probe = FsLock::new(path.to_path_buf(), true).unwrap();
    let held = wait_until(Duration::from_secs(10), || {
        if probe.acquire_write_lock(false).unwrap() {
            probe.release_write_lock().unwrap();
            false
        } else {
            true
        }
    });
    assert!(held, "holder never took the lock");
    child
}

fn stop(mut child: Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[test]
fn test_nonblock_refused_while_held() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("x.lock");
    let holder = hold(temp.path(), &path, false);

    fsguard(temp.path())
        .args(["lock", "--nonblock"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(75)
        .stderr(predicate::str::contains("locked by another process"));

    fsguard(temp.path())
        .args(["lock", "--nonblock", "--shared"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(75);

    stop(holder);

    fsguard(temp.path())
        .args(["lock", "--nonblock"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .success();
}

#[test]
fn test_shared_holders_coexist() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("s.lock");
    let holder = hold(temp.path(), &path, true);

    fsguard(temp.path())
        .args(["lock", "--nonblock", "--shared"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .success();

    fsguard(temp.path())
        .args(["lock", "--nonblock"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(75);

    stop(holder);
}

#[test]
fn test_timeout_gives_up() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("t.lock");
    let holder = hold(temp.path(), &path, false);

    fsguard(temp.path())
        .args(["lock", "--timeout-ms", "200"])
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Timeout acquiring lock"));

    stop(holder);
}

#[test]
fn test_configured_timeout_applies() {
    let temp = TempDir::new().unwrap();
    std::fs::write(
        temp.path().join("fsguard-test-config.toml"),
        "[lock]\ntimeout_ms = 150\nmax_backoff_ms = 20\n",
    )
    .unwrap();
    let path = temp.path().join("c.lock");
    let holder = hold(temp.path(), &path, false);

    fsguard(temp.path())
        .arg("lock")
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Timeout acquiring lock"));

    stop(holder);
}

#[test]
fn test_lock_released_after_command() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("r.lock");

    fsguard(temp.path())
        .args(["lock", "--create"])
        .arg(&path)
        .args(["--", "sh", "-c", "echo inside"])
        .assert()
        .success()
        .stdout("inside\n");

    let mut probe = FsLock::new(&path, false).unwrap();
    assert!(probe.acquire_write_lock(false).unwrap());
}

#[test]
fn test_missing_lock_file_without_create() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.lock");

    fsguard(temp.path())
        .arg("lock")
        .arg(&path)
        .args(["--", "true"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--create"));
    assert!(!path.exists());
}
