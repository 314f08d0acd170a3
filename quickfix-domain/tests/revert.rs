use pretty_assertions::assert_eq;
use quickfix_check::{Checker, PathImporter};
use quickfix_domain::{QuickFixer, RevertReport, Reverter};
use quickfix_syntax::{parse_file, print_file};
use quickfix_types::Package;

fn load(src: &str) -> Package {
    let mut package = Package::new("main");
    parse_file(&mut package, "main.go", src).expect("test source should parse");
    package
}

fn print(package: &Package) -> String {
    print_file(package, package.files[0])
}

const ORIGINAL: &str = r#"package main

import (
	"fmt"
	_ "image/png"
)

func main() {
	x := 1
}
"#;

#[test]
fn revert_undoes_quick_fix() {
    let mut package = load(ORIGINAL);
    QuickFixer::new(Checker::default())
        .quick_fix(&mut package)
        .expect("fixable");
    let fixed = print(&package);
    assert!(fixed.contains("\t_ \"fmt\"\n"), "{fixed}");
    assert!(fixed.contains("\t_ = x\n"), "{fixed}");

    let mut package = load(&fixed);
    let report = Reverter::new(PathImporter::new()).revert(&mut package);

    assert_eq!(
        report,
        RevertReport {
            discards_removed: 1,
            imports_restored: 1,
            imports_kept: 1,
        }
    );
    assert_eq!(print(&package), ORIGINAL);
}

#[test]
fn referenced_blank_import_is_restored_even_with_side_effects() {
    let src = r#"package main

import _ "image/png"

func main() {
	png.Decode(nil)
}
"#;
    let mut package = load(src);
    let report = Reverter::new(PathImporter::new()).revert(&mut package);
    assert_eq!(report.imports_restored, 1);
    assert!(print(&package).contains("import \"image/png\"\n"));
}

#[test]
fn configured_side_effect_imports_stay_blank() {
    let src = "package main\n\nimport _ \"example.com/plugin/gzip\"\n";
    let mut package = load(src);
    let report = Reverter::new(PathImporter::new())
        .side_effect_imports(["example.com/plugin/*"])
        .revert(&mut package);
    assert_eq!(report.imports_kept, 1);
    assert_eq!(print(&package), src);
}

#[test]
fn discards_are_removed_from_every_statement_list() {
    let src = r#"package main

func main() {
	a := 1
	switch a {
	case 1:
		b := 2
		_ = b
	}
	ch := make(chan int)
	select {
	case c := <-ch:
		_ = f()
		_ = c
	}
	_, _ = a, a
	_ = a
}

func f() int { return 0 }
"#;
    let want = r#"package main

func main() {
	a := 1
	switch a {
	case 1:
		b := 2
	}
	ch := make(chan int)
	select {
	case c := <-ch:
		_ = f()
	}
	_, _ = a, a
}

func f() int { return 0 }
"#;
    let mut package = load(src);
    let report = Reverter::new(PathImporter::new()).revert(&mut package);
    assert_eq!(report.discards_removed, 3);
    assert_eq!(print(&package), want);
}
