//! End-to-end tests for the goquickfix binary.

#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const UNUSED: &str = "package main\n\nimport \"os\"\n\nfunc main() {\n\tx := 1\n}\n";
const FIXED: &str = "package main\n\nimport _ \"os\"\n\nfunc main() {\n\tx := 1\n\t_ = x\n}\n";

fn goquickfix() -> Command {
    Command::cargo_bin("goquickfix").expect("goquickfix binary")
}

fn temp_with(files: &[(&str, &str)]) -> TempDir {
    let td = tempfile::tempdir().expect("tempdir");
    for (name, contents) in files {
        fs::write(td.path().join(name), contents).unwrap();
    }
    td
}

fn testdata(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/testdata")
        .join(name)
}

#[test]
fn test_missing_paths_is_a_usage_error() {
    goquickfix()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_write_and_diff_conflict() {
    goquickfix().args(["-w", "-d", "main.go"]).assert().code(2);
}

#[test]
fn test_fixed_source_goes_to_stdout() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .arg("main.go")
        .assert()
        .success()
        .stdout(FIXED);

    assert_eq!(fs::read_to_string(temp.path().join("main.go")).unwrap(), UNUSED);
}

#[test]
fn test_write_flag_rewrites_in_place() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .args(["-w", "main.go"])
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(temp.path().join("main.go")).unwrap(), FIXED);
}

#[test]
fn test_diff_flag_prints_a_patch() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .args(["-d", "main.go"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "diff -u a/main.go b/main.go\n--- a/main.go\n+++ b/main.go\n",
        ))
        .stdout(predicate::str::contains("-import \"os\"\n+import _ \"os\"\n"))
        .stdout(predicate::str::contains("+\t_ = x\n"));
}

#[test]
fn test_clean_package_prints_nothing() {
    goquickfix()
        .arg(testdata("clean"))
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_revert_round_trip() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .args(["-w", "main.go"])
        .assert()
        .success();
    goquickfix()
        .current_dir(temp.path())
        .args(["-w", "--revert", "main.go"])
        .assert()
        .success();

    assert_eq!(fs::read_to_string(temp.path().join("main.go")).unwrap(), UNUSED);
}

#[test]
fn test_unfixable_errors_exit_one() {
    let temp = temp_with(&[(
        "main.go",
        "package main\n\nfunc main() {\n\tx := 1\n\ty()\n}\n",
    )]);

    goquickfix()
        .current_dir(temp.path())
        .args(["-w", "--max-tries", "2", "main.go"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("1 error(s):"))
        .stderr(predicate::str::contains("main.go:5:2: undefined: y"));

    // Nothing is written when a package fails.
    assert_eq!(
        fs::read_to_string(temp.path().join("main.go")).unwrap(),
        "package main\n\nfunc main() {\n\tx := 1\n\ty()\n}\n"
    );
}

#[test]
fn test_directory_must_be_alone() {
    let temp = temp_with(&[("main.go", UNUSED)]);
    fs::create_dir(temp.path().join("pkg")).unwrap();

    goquickfix()
        .current_dir(temp.path())
        .args(["main.go", "pkg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "you can only specify exactly one directory",
        ));
}

#[test]
fn test_config_file_supplies_import_names() {
    let src = "package main\n\nimport \"example.com/lib\"\n\nfunc main() {\n\tother.Run()\n}\n";
    let temp = temp_with(&[
        ("main.go", src),
        ("goquickfix.toml", "[imports]\n\"example.com/lib\" = \"other\"\n"),
    ]);

    goquickfix()
        .current_dir(temp.path())
        .arg("main.go")
        .assert()
        .success()
        .stdout("");
}

#[test]
fn test_explicit_config_must_exist() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .args(["--config", "missing.toml", "main.go"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("read config file missing.toml"));
}

#[test]
fn test_verbose_prints_a_summary() {
    let temp = temp_with(&[("main.go", UNUSED)]);

    goquickfix()
        .current_dir(temp.path())
        .args(["-v", "main.go"])
        .assert()
        .success()
        .stdout(FIXED)
        .stderr(predicate::str::contains("main: 2 pass(es), 2 fix(es)"))
        .stderr(predicate::str::contains("1 file(s) changed, 0 unchanged"));
}
