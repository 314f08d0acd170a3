use pretty_assertions::assert_eq;
use quickfix_check::{Checker, PathImporter};
use quickfix_syntax::parse_file;
use quickfix_types::ast::AssignTok;
use quickfix_types::{NodeKind, Oracle, Package, Pos};

fn package(files: &[(&str, &str)]) -> Package {
    let mut package = Package::new("main");
    for (name, src) in files {
        parse_file(&mut package, *name, src).expect("test source should parse");
    }
    package
}

/// `line:col: message` for every diagnostic.
fn check(files: &[(&str, &str)]) -> Vec<String> {
    let package = package(files);
    Checker::default()
        .check(&package)
        .iter()
        .map(|d| {
            let p = package.position(d.pos);
            format!("{}:{}: {}", p.line, p.column, d.message)
        })
        .collect()
}

#[test]
fn clean_package_has_no_diagnostics() {
    let src = r#"package main

import (
	"fmt"
	_ "image/png"
	"strings"
)

type point struct {
	X, Y int
}

func (p point) sum() int { return p.X + p.Y }

func main() {
	p := point{X: 1, Y: 2}
	m := map[string]int{"a": 1}
	for k, v := range m {
		fmt.Println(k, v)
	}
	var out []string
	out = append(out, strings.ToUpper("x"))
	fmt.Println(p.sum(), out)
}
"#;
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn reports_unused_variable_at_declaration() {
    let src = "package main\n\nfunc main() {\n\tx := 1\n\ty := 2\n\t_ = y\n}\n";
    assert_eq!(check(&[("main.go", src)]), vec!["4:2: x declared but not used"]);
}

#[test]
fn plain_assignment_is_not_a_use() {
    let src = "package main\n\nfunc main() {\n\tx := 1\n\tx = 2\n\tn := 0\n\tn++\n\tm := 1\n\tm += 2\n}\n";
    assert_eq!(check(&[("main.go", src)]), vec!["4:2: x declared but not used"]);
}

#[test]
fn parameters_and_results_are_never_reported() {
    let src = "package main\n\nfunc f(a int, b string) (err error) {\n\treturn nil\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn reports_unused_imports_with_quoted_path() {
    let src = "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\tstr \"strings\"\n)\n\nfunc main() {\n\tfmt.Println()\n}\n";
    assert_eq!(
        check(&[("main.go", src)]),
        vec![
            "5:2: \"os\" imported but not used",
            "6:6: \"strings\" imported but not used as str",
        ]
    );
}

#[test]
fn import_name_comes_from_importer() {
    let src = "package main\n\nimport \"github.com/x/go-thing\"\n\nfunc main() {\n\tthing.Run()\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());

    let mut importer = PathImporter::new();
    importer.insert("github.com/x/go-thing", "other");
    let package = package(&[("main.go", src)]);
    let messages: Vec<_> = Checker::new(importer)
        .check(&package)
        .into_iter()
        .map(|d| d.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "\"github.com/x/go-thing\" imported but not used",
            "undefined: thing",
        ]
    );
}

#[test]
fn reports_redundant_define_at_token() {
    let src = "package main\n\nfunc f() (int, error) { return 0, nil }\n\nfunc main() {\n\tn, err := f()\n\tn, err := f()\n\t_, _ = n, err\n}\n";
    assert_eq!(
        check(&[("main.go", src)]),
        vec!["7:9: no new variables on left side of :="]
    );
}

#[test]
fn redundant_define_in_range_is_reported_at_for() {
    let src = "package main\n\nfunc main() {\n\txs := []int{1}\n\tfor _ := range xs {\n\t}\n}\n";
    assert_eq!(
        check(&[("main.go", src)]),
        vec!["5:2: no new variables on left side of :="]
    );
}

#[test]
fn nested_scopes_shadow() {
    let src = "package main\n\nfunc main() {\n\tx := 1\n\tif true {\n\t\tx := 2\n\t\t_ = x\n\t}\n\t_ = x\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn closures_read_enclosing_variables() {
    let src = "package main\n\nfunc main() {\n\tx := 1\n\tf := func() int { return x }\n\t_ = f\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn struct_literal_keys_are_field_names() {
    let src = "package main\n\ntype T struct{ Name string }\n\nfunc main() {\n\tt := T{Name: \"x\"}\n\t_ = t\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn reports_undefined_and_redeclared() {
    let src = "package main\n\nfunc main() {\n\tvar a int\n\tvar a string\n\t_ = a\n\t_ = missing\n}\n";
    assert_eq!(
        check(&[("main.go", src)]),
        vec!["5:6: a redeclared in this block", "7:6: undefined: missing"]
    );
}

#[test]
fn package_scope_spans_files() {
    let a = "package main\n\nfunc main() {\n\thelper()\n}\n";
    let b = "package main\n\nimport \"os\"\n\nfunc helper() {\n\tv := 1\n}\n";
    assert_eq!(
        check(&[("a.go", a), ("b.go", b)]),
        vec![
            "3:8: \"os\" imported but not used",
            "6:2: v declared but not used",
        ]
    );
}

#[test]
fn dot_import_suppresses_undefined() {
    let src = "package main\n\nimport . \"fmt\"\n\nfunc main() {\n\tPrintln()\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn unused_dot_import_is_reported() {
    let src = "package main\n\nimport . \"strings\"\n\nfunc main() {\n}\n";
    assert_eq!(
        check(&[("main.go", src)]),
        vec!["3:10: \"strings\" imported but not used"]
    );
}

#[test]
fn undefined_names_mark_every_dot_import_used() {
    let src = "package main\n\nimport (\n\t. \"fmt\"\n\t. \"strings\"\n)\n\nfunc main() {\n\tPrintln(ToUpper(\"x\"))\n}\n";
    assert_eq!(check(&[("main.go", src)]), Vec::<String>::new());
}

#[test]
fn synthesized_references_are_reported_at_the_enclosing_block() {
    let mut package = package(&[("main.go", "package main\n\nfunc main() {\n\tprintln()\n}\n")]);
    let root = package.files[0];
    let body = package
        .ast
        .descendants(root)
        .into_iter()
        .find(|&id| matches!(package.ast.kind(id), NodeKind::Block { .. }))
        .expect("function body");
    let lhs = package.ast.synthesize(NodeKind::Ident { name: "_".into() });
    let rhs = package.ast.synthesize(NodeKind::Ident { name: "y".into() });
    let stmt = package.ast.synthesize(NodeKind::Assign {
        lhs: vec![lhs],
        tok: AssignTok::Assign,
        tok_pos: Pos::NONE,
        rhs: vec![rhs],
    });
    package
        .ast
        .stmt_list_mut(body)
        .expect("block statements")
        .push(stmt);

    let diags = Checker::default().check(&package);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].message, "undefined: y");
    assert_eq!(package.position(diags[0].pos).to_string(), "main.go:3:13");
}

#[test]
fn usable_as_oracle() {
    let package = package(&[("main.go", "package main\n\nfunc main() {\n\tx := 1\n}\n")]);
    let oracle: &dyn Oracle = &Checker::default();
    assert_eq!(oracle.check(&package).len(), 1);
}

#[test]
fn switch_and_select_clauses_have_own_scopes() {
    let src = r#"package main

func main() {
	ch := make(chan int)
	switch n := 1; n {
	case 1:
		y := n
		_ = y
	default:
		z := 0
	}
	select {
	case v := <-ch:
		_ = v
	default:
	}
}
"#;
    assert_eq!(check(&[("main.go", src)]), vec!["10:3: z declared but not used"]);
}
