use crate::common::fsguard;
use fsguard::test_utils::mode_of;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_default_mode_from_config() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("fsguard-test-config.toml"), "default_dir_mode = 0o710\n").unwrap();
    let target = temp.path().join("d");

    fsguard(temp.path()).arg("ensure-dir").arg(&target).assert().success();
    assert_eq!(mode_of(&target), 0o710);
}

#[test]
fn test_config_flag_overrides_env() {
    let temp = TempDir::new().unwrap();
    let custom = temp.path().join("custom.toml");
    std::fs::write(&custom, "default_dir_mode = 0o700\nminimal = false\n").unwrap();
    let target = temp.path().join("d");
    std::fs::create_dir(&target).unwrap();
    fsguard::test_utils::set_mode(&target, 0o777);

    // minimal = false from the file makes the mode exact
    fsguard(temp.path()).arg("--config").arg(&custom).arg("ensure-dir").arg(&target).assert().success();
    assert_eq!(mode_of(&target), 0o700);
}

#[test]
fn test_invalid_config_is_reported() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("fsguard-test-config.toml"), "minimal = maybe\n").unwrap();

    fsguard(temp.path())
        .args(["normalize", "/x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"))
        .stderr(predicate::str::contains("TOML syntax"));
}
