//! End-to-end runs over the packages under `tests/testdata`.

use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use pretty_assertions::assert_eq;
use quickfix_check::Checker;
use quickfix_core::adapters::{FsOutput, FsSource, InMemoryOutput, InMemorySource};
use quickfix_core::{Mode, ModeReport, OutputMode, RunSettings, ToolError, run};
use quickfix_syntax::parse_file;
use quickfix_types::Package;
use std::collections::BTreeMap;
use tempfile::TempDir;

fn testdata(name: &str) -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/testdata")
        .join(name)
}

fn settings(paths: Vec<Utf8PathBuf>) -> RunSettings {
    RunSettings {
        paths,
        ..RunSettings::default()
    }
}

/// Copy a testdata package into a scratch directory.
fn scratch(name: &str) -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    for entry in fs::read_dir(testdata(name)).unwrap() {
        let entry = entry.unwrap();
        fs::copy(entry.path(), root.join(entry.file_name().to_str().unwrap())).unwrap();
    }
    (temp, root)
}

fn diagnostics(name: &str, src: &str) -> Vec<String> {
    let mut package = Package::new(name);
    parse_file(&mut package, format!("{name}.go"), src).unwrap();
    Checker::default()
        .check(&package)
        .into_iter()
        .map(|d| d.message)
        .collect()
}

#[test]
fn general_package_matches_golden() {
    let output = InMemoryOutput::new();
    let outcome = run(&settings(vec![testdata("general")]), &FsSource, &output).unwrap();

    let golden = fs::read_to_string(testdata("general").join("general.go.golden")).unwrap();
    assert_eq!(output.emitted(), golden);
    assert_eq!(outcome.changed, vec![testdata("general").join("general.go")]);
    assert!(diagnostics("general", &golden).is_empty());

    let ModeReport::Fixed(report) = &outcome.packages[0].report else {
        panic!("expected a fix report");
    };
    assert_eq!(report.total_applied(), 6);
}

#[test]
fn range_statements_are_fixed_in_their_bodies() {
    let output = InMemoryOutput::new();
    run(&settings(vec![testdata("rangestmt")]), &FsSource, &output).unwrap();

    let fixed = output.emitted();
    assert!(fixed.contains("\tfor i, x := range xs {\n\t\t_ = i\n\t\t_ = x\n\t}\n"), "{fixed}");
    assert!(fixed.contains("\tfor k, v := range m {\n\t\t_ = k\n\t\t_ = v\n\t}\n"), "{fixed}");
    assert!(fixed.contains("\tfor _ = range xs {\n"), "{fixed}");
    assert!(diagnostics("rangestmt", &fixed).is_empty());
}

#[test]
fn imports_named_apart_from_their_path() {
    let output = InMemoryOutput::new();
    run(&settings(vec![testdata("importname")]), &FsSource, &output).unwrap();

    let fixed = output.emitted();
    assert!(fixed.contains("\t_ \"strings\"\n"), "{fixed}");
    assert!(fixed.contains("\t\"github.com/mattn/go-sqlite3\"\n"), "{fixed}");
    assert!(fixed.contains("\t_ \"gopkg.in/yaml.v3\"\n"), "{fixed}");
}

#[test]
fn clean_package_is_skipped() {
    let output = InMemoryOutput::new();
    let outcome = run(&settings(vec![testdata("clean")]), &FsSource, &output).unwrap();

    assert!(outcome.changed.is_empty());
    assert_eq!(outcome.unchanged, 1);
    assert_eq!(output.emitted(), "");
}

#[test]
fn write_mode_rewrites_only_changed_files() {
    let (_temp, root) = scratch("multifile");
    let run_settings = RunSettings {
        output: OutputMode::Write,
        ..settings(vec![root.clone()])
    };

    let outcome = run(&run_settings, &FsSource, &FsOutput).unwrap();
    assert_eq!(outcome.changed, vec![root.join("a.go"), root.join("b.go")]);
    assert_eq!(outcome.packages.len(), 1);
    assert_eq!(outcome.packages[0].name, "multifile");

    let a = fs::read_to_string(root.join("a.go")).unwrap();
    let b = fs::read_to_string(root.join("b.go")).unwrap();
    assert!(a.contains("import _ \"os\"\n"), "{a}");
    assert!(b.contains("\tunused := 1\n\t_ = unused\n"), "{b}");
    // Directory mode never reads underscore files.
    assert!(
        fs::read_to_string(root.join("_ignored.go"))
            .unwrap()
            .contains("this file is skipped")
    );

    let again = run(&run_settings, &FsSource, &FsOutput).unwrap();
    assert!(again.changed.is_empty());
    assert_eq!(again.unchanged, 2);
}

#[test]
fn revert_mode_restores_imports_and_drops_discards() {
    let output = InMemoryOutput::new();
    let run_settings = RunSettings {
        mode: Mode::Revert,
        ..settings(vec![testdata("revert")])
    };
    let outcome = run(&run_settings, &FsSource, &output).unwrap();

    let reverted = output.emitted();
    assert!(reverted.contains("import \"fmt\"\n"), "{reverted}");
    assert!(reverted.contains("import _ \"image/png\"\n"), "{reverted}");
    assert!(!reverted.contains("_ = x"), "{reverted}");
    assert!(matches!(outcome.packages[0].report, ModeReport::Reverted(_)));
}

#[test]
fn explicit_files_from_two_packages() {
    let source = InMemorySource::new()
        .with_file("one.go", "package one\n\nfunc F() {\n\tx := 1\n}\n")
        .with_file("two.go", "package two\n\nimport \"os\"\n");
    let output = InMemoryOutput::new();
    let run_settings = RunSettings {
        output: OutputMode::Write,
        ..settings(vec!["one.go".into(), "two.go".into()])
    };

    let outcome = run(&run_settings, &source, &output).unwrap();
    let names: Vec<_> = outcome.packages.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two"]);

    let written = output.written();
    assert_eq!(
        written[Utf8Path::new("one.go")],
        "package one\n\nfunc F() {\n\tx := 1\n\t_ = x\n}\n"
    );
    assert_eq!(written[Utf8Path::new("two.go")], "package two\n\nimport _ \"os\"\n");
}

#[test]
fn import_name_overrides_reach_the_checker() {
    let src = "package main\n\nimport \"example.com/lib\"\n\nfunc main() {\n\tother.Run()\n}\n";
    let source = InMemorySource::new().with_file("main.go", src);
    let output = InMemoryOutput::new();
    let run_settings = RunSettings {
        import_names: BTreeMap::from([("example.com/lib".to_string(), "other".to_string())]),
        ..settings(vec!["main.go".into()])
    };

    let outcome = run(&run_settings, &source, &output).unwrap();
    assert_eq!(outcome.unchanged, 1);
}

#[test]
fn unresolved_package_writes_nothing() {
    let source = InMemorySource::new()
        .with_file("a.go", "package a\n\nfunc F() {\n\tx := 1\n}\n")
        .with_file("b.go", "package b\n\nfunc G() {\n\tundefinedThing()\n}\n");
    let output = InMemoryOutput::new();
    let run_settings = RunSettings {
        output: OutputMode::Write,
        max_tries: 3,
        ..settings(vec!["a.go".into(), "b.go".into()])
    };

    let err = run(&run_settings, &source, &output).unwrap_err();
    let ToolError::Unresolved { package, .. } = &err else {
        panic!("expected an unresolved error, got {err}");
    };
    assert_eq!(package, "b");
    assert_eq!(
        err.to_string(),
        "1 error(s):\n- b.go:4:2: undefined: undefinedThing"
    );
    assert!(output.written().is_empty());
}
