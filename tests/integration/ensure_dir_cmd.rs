use crate::common::{fsguard, fsguard_unprivileged, run_to_completion};
use fsguard::test_utils::{mode_of, set_mode};
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_creates_tree_with_exact_mode() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("a");
    let c = a.join("b").join("c");

    fsguard(temp.path())
        .args(["ensure-dir", "--mode", "755"])
        .arg(&c)
        .assert()
        .success()
        .stdout(predicate::str::contains("created").count(3));

    for dir in [a.clone(), a.join("b"), c.clone()] {
        assert_eq!(mode_of(&dir), 0o755, "{}", dir.display());
    }
}

#[test]
fn test_umask_does_not_apply() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("shared");

    // The child inherits whatever umask the test runner has; 0o777 only
    // survives if the command clears it
    fsguard(temp.path())
        .args(["ensure-dir", "--mode", "0o777"])
        .arg(&target)
        .assert()
        .success();
    assert_eq!(mode_of(&target), 0o777);
}

#[test]
fn test_minimal_and_exact_on_existing() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("d");
    std::fs::create_dir(&dir).unwrap();
    set_mode(&dir, 0o707);

    fsguard(temp.path())
        .args(["--quiet", "ensure-dir", "--mode", "755"])
        .arg(&dir)
        .assert()
        .success()
        .stdout("");
    assert_eq!(mode_of(&dir), 0o757);

    fsguard(temp.path())
        .args(["ensure-dir", "--exact", "--mode", "700"])
        .arg(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
    assert_eq!(mode_of(&dir), 0o700);
}

#[test]
fn test_restrictive_mode_still_creates_children() {
    let temp = TempDir::new().unwrap();
    let a = temp.path().join("ro");
    let leaf = a.join("leaf");

    fsguard(temp.path())
        .args(["ensure-dir", "--mode", "500"])
        .arg(&leaf)
        .assert()
        .success();

    assert_eq!(mode_of(&a), 0o500);
    assert_eq!(mode_of(&leaf), 0o500);

    set_mode(&leaf, 0o700);
    set_mode(&a, 0o700);
}

#[test]
fn test_locked_parent_is_restored() {
    let temp = TempDir::new().unwrap();
    let parent = temp.path().join("locked");
    std::fs::create_dir(&parent).unwrap();
    set_mode(&parent, 0o500);

    fsguard(temp.path())
        .args(["ensure-dir", "--mode", "750"])
        .arg(parent.join("child"))
        .assert()
        .success();

    assert_eq!(mode_of(&parent), 0o500);
    assert_eq!(mode_of(&parent.join("child")), 0o750);
    set_mode(&parent, 0o700);
}

#[test]
fn test_file_in_the_way_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file");
    std::fs::write(&file, "x").unwrap();

    fsguard(temp.path())
        .arg("ensure-dir")
        .arg(file.join("sub").join("leaf"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not a directory"))
        .stderr(predicate::str::contains("suggestion"));

    assert!(file.is_file());
}

#[test]
fn test_invalid_mode_rejected_by_parser() {
    let temp = TempDir::new().unwrap();

    fsguard(temp.path())
        .args(["ensure-dir", "--mode", "999"])
        .arg(temp.path().join("x"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid octal mode"));
    assert!(!temp.path().join("x").exists());
}

#[test]
fn test_unsearchable_modes_as_ordinary_user() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let a = root.join("a");
    let b = a.join("b");

    // Fresh tree whose mode denies search to its owner
    let output = run_to_completion(fsguard_unprivileged(root).args(["ensure-dir", "--mode", "600"]).arg(&b));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(mode_of(&a), 0o600);

    // Existing parent that has to be opened up for the walk and restored
    let parent = root.join("p");
    let output = run_to_completion(fsguard_unprivileged(root).args(["ensure-dir", "--mode", "600"]).arg(&parent));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let child = parent.join("child");
    let output = run_to_completion(fsguard_unprivileged(root).args(["ensure-dir", "--mode", "755"]).arg(&child));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(mode_of(&parent), 0o600);

    // Open everything back up, then check the leaves and let the tempdir clean up
    for dir in [&a, &parent] {
        set_mode(dir, 0o700);
    }
    assert_eq!(mode_of(&b), 0o600);
    assert_eq!(mode_of(&child), 0o755);
    set_mode(&b, 0o700);
}
