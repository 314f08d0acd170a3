//! Lexer, parser and printer for the Go subset goquickfix rewrites.
//!
//! Parsing adds the file to a [`Package`]'s shared file set and arena, so
//! positions of every file in one package are globally comparable. Printing
//! renders a translation unit back to gofmt-style text, including any
//! structural edits made to the tree in between.

mod align;
pub mod error;
pub mod lexer;
mod parser;
mod printer;

pub use error::{ParseError, ParseErrors};
pub use printer::print_file;

use camino::Utf8PathBuf;
use quickfix_types::{FileSet, NodeId, Package};
use tracing::debug;

/// Parse `src` as a new file of `package` and register it in
/// `package.files`.
pub fn parse_file(
    package: &mut Package,
    filename: impl Into<Utf8PathBuf>,
    src: &str,
) -> Result<NodeId, ParseErrors> {
    let filename = filename.into();
    let index = package.fset.add_file(filename.clone(), src);
    let file = package.fset.get(index);

    let lexed = lexer::tokenize(file, src);
    let mut errors: Vec<ParseError> = lexed
        .errors
        .iter()
        .map(|(pos, message)| ParseError {
            position: file.position(*pos),
            message: message.clone(),
        })
        .collect();

    let mut parser = parser::Parser::new(file, &mut package.ast, lexed.tokens);
    let root = match parser.parse_file(lexed.comments) {
        Ok(root) => Some(root),
        Err(err) => {
            errors.push(err);
            None
        }
    };

    match root {
        Some(root) if errors.is_empty() => {
            debug!(file = %filename, nodes = package.ast.len(), "parsed");
            package.files.push(root);
            Ok(root)
        }
        _ => Err(ParseErrors(errors)),
    }
}

/// Declared package name of `src`, read from its package clause without
/// parsing the rest of the file.
pub fn package_name(src: &str) -> Option<String> {
    let mut fset = FileSet::new();
    let index = fset.add_file("", src);
    let lexed = lexer::tokenize(fset.get(index), src);

    let mut tokens = lexed.tokens.into_iter().map(|t| t.tok);
    match (tokens.next(), tokens.next()) {
        (Some(lexer::Tok::Package), Some(lexer::Tok::Ident(name))) => Some(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quickfix_types::NodeKind;
    use quickfix_types::ast::AssignTok;

    fn parse(src: &str) -> (Package, NodeId) {
        let mut package = Package::new("main");
        let root = parse_file(&mut package, "main.go", src).expect("source should parse");
        (package, root)
    }

    #[test]
    fn parse_registers_file_in_package() {
        let (package, root) = parse("package main\n\nfunc main() {}\n");
        assert_eq!(package.files, vec![root]);
        assert_eq!(package.filename(root), "main.go");
        let file = package.ast.file(root).expect("root is a file");
        assert_eq!(file.package.name, "main");
    }

    #[test]
    fn parse_records_define_token_position() {
        let src = "package main\n\nfunc main() {\n\tx := 1\n\tx = 2\n}\n";
        let (package, root) = parse(src);
        let assigns: Vec<_> = package
            .ast
            .descendants(root)
            .into_iter()
            .filter_map(|id| match package.ast.kind(id) {
                NodeKind::Assign { tok, tok_pos, .. } => Some((*tok, *tok_pos)),
                _ => None,
            })
            .collect();
        assert_eq!(assigns.len(), 2);
        assert_eq!(assigns[0].0, AssignTok::Define);
        let position = package.position(assigns[0].1);
        assert_eq!((position.line, position.column), (4, 4));
        assert_eq!(assigns[1].0, AssignTok::Assign);
    }

    #[test]
    fn parse_flattens_imports() {
        let src = "package main\n\nimport \"fmt\"\n\nimport (\n\t\"os\"\n\t_ \"image/png\"\n)\n";
        let (package, root) = parse(src);
        let file = package.ast.file(root).expect("root is a file");
        assert_eq!(file.imports.len(), 3);
        assert_eq!(file.decls.len(), 2);
    }

    #[test]
    fn parse_error_reports_position() {
        let mut package = Package::new("main");
        let err = parse_file(&mut package, "bad.go", "package main\n\nfunc main() {\n\tx := )\n}\n")
            .expect_err("incomplete assignment");
        assert_eq!(err.len(), 1);
        assert!(err.to_string().starts_with("bad.go:4:"), "{err}");
        assert!(package.files.is_empty());
    }

    #[test]
    fn unsupported_constructs_are_errors() {
        for src in [
            "package main\n\nfunc f(x any) { _ = x.(int) }\n",
            "package main\n\nfunc f() {\nL:\n\tfor {\n\t\tbreak L\n\t}\n}\n",
            "package main\n\nfunc f[T any](x T) {}\n",
        ] {
            let mut package = Package::new("main");
            assert!(parse_file(&mut package, "x.go", src).is_err(), "{src}");
        }
    }

    #[test]
    fn package_name_reads_clause() {
        assert_eq!(package_name("// doc\npackage foo\n\nfunc f() {}\n"), Some("foo".to_string()));
        assert_eq!(package_name("func f() {}"), None);
    }
}
