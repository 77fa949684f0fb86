use crate::common::fsguard;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_normalize_collapses_segments() {
    let temp = TempDir::new().unwrap();

    fsguard(temp.path())
        .args(["normalize", "//usr//local/../bin/"])
        .assert()
        .success()
        .stdout("/usr/bin\n");

    fsguard(temp.path())
        .args(["normalize", "a/../../b/."])
        .assert()
        .success()
        .stdout("../b\n");
}

#[test]
fn test_join_respects_absolute_segments() {
    let temp = TempDir::new().unwrap();

    fsguard(temp.path())
        .args(["join", "/usr/portage", "dev-util", "bsdiff"])
        .assert()
        .success()
        .stdout("/usr/portage/dev-util/bsdiff\n");

    fsguard(temp.path())
        .args(["join", "/usr", "/etc", "passwd"])
        .assert()
        .success()
        .stdout("/etc/passwd\n");
}

#[test]
fn test_abspath_follows_one_symlink() {
    let temp = TempDir::new().unwrap();
    let real = temp.path().join("real");
    std::fs::write(&real, "x").unwrap();
    let link = temp.path().join("link");
    std::os::unix::fs::symlink("real", &link).unwrap();

    let expected = fsguard::utils::fs::normalize_path(&real);
    fsguard(temp.path())
        .arg("abspath")
        .arg(&link)
        .assert()
        .success()
        .stdout(format!("{}\n", expected.display()));
}

#[test]
fn test_abspath_relative_to_cwd() {
    let temp = TempDir::new().unwrap();
    let cwd = fsguard::utils::fs::normalize_path(temp.path());

    fsguard(temp.path())
        .current_dir(temp.path())
        .args(["abspath", "sub/../missing"])
        .assert()
        .success()
        .stdout(format!("{}\n", cwd.join("missing").display()));
}

#[test]
fn test_abspath_through_file_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file");
    std::fs::write(&file, "x").unwrap();

    fsguard(temp.path())
        .arg("abspath")
        .arg(file.join("child"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Not a directory"));
}
