//! Printer round trips: gofmt-formatted input prints back unchanged, and a
//! few non-canonical inputs print in canonical form.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use quickfix_syntax::{parse_file, print_file};
use quickfix_types::Package;

fn reprint(src: &str) -> String {
    let mut package = Package::new("demo");
    let root = parse_file(&mut package, "demo.go", src).expect("source should parse");
    print_file(&package, root)
}

const DECLARATIONS: &str = r#"// Package demo exercises the printer.
package demo

import (
	"fmt"
	_ "image/png"
	str "strings"
)

const (
	A   = 1
	Bcd = 2
)

type Point struct {
	X    int    `json:"x"`
	Name string // label
}

type Shape interface {
	Area() float64
	fmt.Stringer
}

var global = map[string]int{
	"a":   1,
	"bcd": 2,
}

var empty struct{}

// Sum adds.
func Sum(xs ...int) (total int) {
	for _, x := range xs {
		total += x
	}
	return total
}

func (p *Point) String() string { return fmt.Sprintf("%d", p.X) }

func noop() {}

func pair() (int, error) {
	return 0, nil
}
"#;

const STATEMENTS: &str = r#"package demo

import "fmt"

func main() {
	x := 1
	if x > 0 {
		fmt.Println(str("a"), x*2+1)
	} else if x < -1 {
		x++
	} else {
		x--
	}

	switch x {
	case 1, 2:
		fmt.Println("small")
	default:
	}
	ch := make(chan int, 1)
	ch <- x
	select {
	case v := <-ch:
		_ = v
	default:
	}
	xs := []int{1, 2, 3}
	for i := 0; i < len(xs)-1; i++ {
	}
	for range xs {
		break
	}
	for {
		continue
	}
	go func(n int) {
		fmt.Println(n)
	}(x)
	defer func() {
		recover()
	}()
	var (
		a, b int
		c    = xs[1:2]
	)
	fmt.Println(a, b, c, xs[len(xs)-1])
}

func str(s string) string { return s }
"#;

const COMMENTS: &str = r#"package demo

func f() int {
	// leading
	a := 1   // trailing a
	bb := 22 // trailing bb

	return a + bb
	// end
}

/* block
comment */
func g() {
	call(
		1,
		2,
	)
}

func call(xs ...int) {}
"#;

#[test]
fn declarations_round_trip() {
    assert_eq!(reprint(DECLARATIONS), DECLARATIONS);
}

#[test]
fn statements_round_trip() {
    assert_eq!(reprint(STATEMENTS), STATEMENTS);
}

#[test]
fn comments_round_trip() {
    assert_eq!(reprint(COMMENTS), COMMENTS);
}

#[test]
fn non_canonical_input_is_normalized() {
    let src = "package demo\nfunc f(x int) {\n  if (x > 0) {\n    y := []int{1,2}\n    _ = y\n  }\n}\n";
    let want = "package demo\n\nfunc f(x int) {\n\tif x > 0 {\n\t\ty := []int{1, 2}\n\t\t_ = y\n\t}\n}\n";
    assert_eq!(reprint(src), want);
}

#[test]
fn printing_is_idempotent() {
    for src in [DECLARATIONS, STATEMENTS, COMMENTS] {
        let once = reprint(src);
        assert_eq!(reprint(&once), once);
    }
}

fn arb_token_soup() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "package", "main", "import", "func", "var", "if", "for", "range", "switch", "case",
            "default", "(", ")", "{", "}", "[", "]", ",", ";", ":", ":=", "=", "x", "_", "1",
            "\"s\"", "\n", "+", "*", "<-", ".", "//c\n",
        ]),
        0..60,
    )
    .prop_map(|tokens| tokens.join(" "))
}

proptest! {
    /// Arbitrary token sequences are either parsed or rejected, never a panic.
    #[test]
    fn parser_never_panics(src in arb_token_soup()) {
        let mut package = Package::new("main");
        if let Ok(root) = parse_file(&mut package, "soup.go", &src) {
            let _ = print_file(&package, root);
        }
    }
}
