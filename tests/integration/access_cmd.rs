use crate::common::fsguard;
use fsguard::test_utils::set_mode;
use nix::unistd::Uid;
use tempfile::TempDir;

#[test]
fn test_existing_file_is_readable() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");
    std::fs::write(&file, "x").unwrap();

    for extra in [&[][..], &["--fallback"][..]] {
        fsguard(temp.path())
            .args(["access", "-r", "-w"])
            .args(extra)
            .arg(&file)
            .assert()
            .success()
            .stdout("yes\n");
    }
}

#[test]
fn test_missing_path_answers_no() {
    let temp = TempDir::new().unwrap();

    fsguard(temp.path())
        .arg("access")
        .arg(temp.path().join("missing"))
        .assert()
        .code(1)
        .stdout("no\n");
}

#[test]
fn test_execute_without_any_x_bit_is_refused() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("data");
    std::fs::write(&file, "x").unwrap();
    set_mode(&file, 0o644);

    // Root included: without an execute bit anywhere nobody may execute
    fsguard(temp.path())
        .args(["access", "-x", "--fallback"])
        .arg(&file)
        .assert()
        .code(1)
        .stdout("no\n");

    set_mode(&file, 0o754);
    fsguard(temp.path())
        .args(["access", "-x", "--fallback"])
        .arg(&file)
        .assert()
        .success()
        .stdout("yes\n");
}

#[test]
fn test_owner_without_write_is_refused() {
    if Uid::current().is_root() {
        return;
    }
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("ro");
    std::fs::write(&file, "x").unwrap();
    set_mode(&file, 0o466);

    for extra in [&[][..], &["--fallback"][..]] {
        fsguard(temp.path())
            .args(["access", "-w"])
            .args(extra)
            .arg(&file)
            .assert()
            .code(1)
            .stdout("no\n");
    }
}

#[test]
fn test_configured_fallback_strategy() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("fsguard-test-config.toml"), "access_strategy = \"fallback\"\n").unwrap();
    let file = temp.path().join("f");
    std::fs::write(&file, "x").unwrap();

    fsguard(temp.path())
        .args(["--verbose", "access", "-r"])
        .arg(&file)
        .assert()
        .success()
        .stdout("yes\n");
}
