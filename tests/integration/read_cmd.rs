use crate::common::fsguard;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn test_read_whole_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");
    std::fs::write(&file, "hello\nworld\n").unwrap();

    fsguard(temp.path()).arg("read").arg(&file).assert().success().stdout("hello\nworld\n");
}

#[test]
fn test_read_lines_strips_whitespace() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");
    std::fs::write(&file, "  a  \n\tb\n").unwrap();

    fsguard(temp.path())
        .args(["read", "--lines"])
        .arg(&file)
        .assert()
        .success()
        .stdout("a\nb\n");

    fsguard(temp.path())
        .args(["read", "--lines", "--keep-whitespace"])
        .arg(&file)
        .assert()
        .success()
        .stdout("  a  \n\tb\n");
}

#[test]
fn test_strict_ascii_rejects_high_bytes() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("f");
    std::fs::write(&file, "caf\u{e9}").unwrap();

    fsguard(temp.path())
        .args(["read", "--encoding", "ascii", "--strict"])
        .arg(&file)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid ascii data"));

    fsguard(temp.path())
        .args(["read", "--encoding", "bytes"])
        .arg(&file)
        .assert()
        .success()
        .stdout("caf\u{e9}");
}

#[test]
fn test_missing_ok() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");

    fsguard(temp.path())
        .args(["read", "--missing-ok"])
        .arg(&missing)
        .assert()
        .success()
        .stdout("");

    fsguard(temp.path())
        .arg("read")
        .arg(&missing)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No such file or directory"));
}
