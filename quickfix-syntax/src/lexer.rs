//! Tokenizer with Go's automatic semicolon insertion.

use quickfix_types::ast::{BinaryOp, Comment};
use quickfix_types::{Pos, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tok {
    Ident(String),
    Int(String),
    Float(String),
    Imag(String),
    Char(String),
    Str(String),

    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Func,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Package,
    Range,
    Return,
    Select,
    Struct,
    Switch,
    Type,
    Var,

    /// A binary operator that is not also a prefix or special token.
    Op(BinaryOp),
    /// `+=`, `-=`, ...
    OpAssign(BinaryOp),
    Add,
    Sub,
    Mul,
    And,
    Xor,
    Arrow,
    Inc,
    Dec,
    Assign,
    Define,
    Not,
    Ellipsis,
    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Period,
    Colon,
    /// `auto` is set when inserted at a newline or end of file.
    Semi {
        auto: bool,
    },
    Illegal(char),
    Eof,
}

impl Tok {
    pub fn describe(&self) -> String {
        match self {
            Tok::Ident(s) | Tok::Int(s) | Tok::Float(s) | Tok::Imag(s) | Tok::Char(s) => s.clone(),
            Tok::Str(s) => s.clone(),
            Tok::Semi { auto: true } => "newline".to_string(),
            Tok::Eof => "EOF".to_string(),
            other => other.text().to_string(),
        }
    }

    fn text(&self) -> &'static str {
        match self {
            Tok::Break => "break",
            Tok::Case => "case",
            Tok::Chan => "chan",
            Tok::Const => "const",
            Tok::Continue => "continue",
            Tok::Default => "default",
            Tok::Defer => "defer",
            Tok::Else => "else",
            Tok::Fallthrough => "fallthrough",
            Tok::For => "for",
            Tok::Func => "func",
            Tok::Go => "go",
            Tok::Goto => "goto",
            Tok::If => "if",
            Tok::Import => "import",
            Tok::Interface => "interface",
            Tok::Map => "map",
            Tok::Package => "package",
            Tok::Range => "range",
            Tok::Return => "return",
            Tok::Select => "select",
            Tok::Struct => "struct",
            Tok::Switch => "switch",
            Tok::Type => "type",
            Tok::Var => "var",
            Tok::Op(op) | Tok::OpAssign(op) => op.as_str(),
            Tok::Add => "+",
            Tok::Sub => "-",
            Tok::Mul => "*",
            Tok::And => "&",
            Tok::Xor => "^",
            Tok::Arrow => "<-",
            Tok::Inc => "++",
            Tok::Dec => "--",
            Tok::Assign => "=",
            Tok::Define => ":=",
            Tok::Not => "!",
            Tok::Ellipsis => "...",
            Tok::LParen => "(",
            Tok::RParen => ")",
            Tok::LBrack => "[",
            Tok::RBrack => "]",
            Tok::LBrace => "{",
            Tok::RBrace => "}",
            Tok::Comma => ",",
            Tok::Period => ".",
            Tok::Colon => ":",
            Tok::Semi { .. } => ";",
            Tok::Illegal(_) => "ILLEGAL",
            Tok::Eof => "EOF",
            Tok::Ident(_)
            | Tok::Int(_)
            | Tok::Float(_)
            | Tok::Imag(_)
            | Tok::Char(_)
            | Tok::Str(_) => "literal",
        }
    }

    /// Binary operator spelled by this token, if any.
    pub fn binary_op(&self) -> Option<BinaryOp> {
        match self {
            Tok::Op(op) => Some(*op),
            Tok::Add => Some(BinaryOp::Add),
            Tok::Sub => Some(BinaryOp::Sub),
            Tok::Mul => Some(BinaryOp::Mul),
            Tok::And => Some(BinaryOp::And),
            Tok::Xor => Some(BinaryOp::Xor),
            _ => None,
        }
    }

    fn keyword(word: &str) -> Option<Tok> {
        Some(match word {
            "break" => Tok::Break,
            "case" => Tok::Case,
            "chan" => Tok::Chan,
            "const" => Tok::Const,
            "continue" => Tok::Continue,
            "default" => Tok::Default,
            "defer" => Tok::Defer,
            "else" => Tok::Else,
            "fallthrough" => Tok::Fallthrough,
            "for" => Tok::For,
            "func" => Tok::Func,
            "go" => Tok::Go,
            "goto" => Tok::Goto,
            "if" => Tok::If,
            "import" => Tok::Import,
            "interface" => Tok::Interface,
            "map" => Tok::Map,
            "package" => Tok::Package,
            "range" => Tok::Range,
            "return" => Tok::Return,
            "select" => Tok::Select,
            "struct" => Tok::Struct,
            "switch" => Tok::Switch,
            "type" => Tok::Type,
            "var" => Tok::Var,
            _ => return None,
        })
    }

    fn ends_statement(&self) -> bool {
        matches!(
            self,
            Tok::Ident(_)
                | Tok::Int(_)
                | Tok::Float(_)
                | Tok::Imag(_)
                | Tok::Char(_)
                | Tok::Str(_)
                | Tok::Break
                | Tok::Continue
                | Tok::Fallthrough
                | Tok::Return
                | Tok::Inc
                | Tok::Dec
                | Tok::RParen
                | Tok::RBrack
                | Tok::RBrace
        )
    }
}

#[derive(Debug, Clone)]
pub struct Token {
    pub tok: Tok,
    pub pos: Pos,
    pub end: Pos,
}

/// Lexical errors as (position, message).
pub type LexError = (Pos, String);

#[derive(Debug, Default)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
    pub errors: Vec<LexError>,
}

pub fn tokenize(file: &SourceFile, src: &str) -> Lexed {
    Lexer {
        file,
        src: src.as_bytes(),
        off: 0,
        out: Lexed::default(),
    }
    .run()
}

struct Lexer<'a> {
    file: &'a SourceFile,
    src: &'a [u8],
    off: usize,
    out: Lexed,
}

impl Lexer<'_> {
    fn run(mut self) -> Lexed {
        loop {
            let newline_ends = self
                .out
                .tokens
                .last()
                .is_some_and(|t| t.tok.ends_statement());

            self.skip_space(newline_ends);
            if self.off >= self.src.len() {
                if newline_ends {
                    self.push(Tok::Semi { auto: true }, self.off, self.off);
                }
                self.push(Tok::Eof, self.off, self.off);
                return self.out;
            }

            let start = self.off;
            let c = self.src[start];

            if c == b'\n' {
                // Only reached when a semicolon is due.
                self.off += 1;
                self.push(Tok::Semi { auto: true }, start, start + 1);
                continue;
            }

            if c == b'/' && self.peek(1) == Some(b'/') {
                let end = self.line_end(start);
                self.comment(start, end);
                self.off = end;
                continue;
            }

            if c == b'/' && self.peek(1) == Some(b'*') {
                let end = match find(self.src, start + 2, b"*/") {
                    Some(i) => i + 2,
                    None => {
                        self.error(start, "comment not terminated");
                        self.src.len()
                    }
                };
                self.comment(start, end);
                self.off = end;
                if newline_ends && self.src[start..end].contains(&b'\n') {
                    self.push(Tok::Semi { auto: true }, start, start);
                }
                continue;
            }

            let tok = if is_letter(c) {
                self.ident()
            } else if c.is_ascii_digit() || (c == b'.' && self.peek(1).is_some_and(|d| d.is_ascii_digit())) {
                self.number()
            } else {
                match c {
                    b'"' => self.string(),
                    b'`' => self.raw_string(),
                    b'\'' => self.char_lit(),
                    _ => self.operator(),
                }
            };
            self.push(tok, start, self.off);
        }
    }

    fn push(&mut self, tok: Tok, start: usize, end: usize) {
        self.out.tokens.push(Token {
            tok,
            pos: self.file.pos(start),
            end: self.file.pos(end),
        });
    }

    fn error(&mut self, at: usize, msg: impl Into<String>) {
        self.out.errors.push((self.file.pos(at), msg.into()));
    }

    fn comment(&mut self, start: usize, end: usize) {
        let text = String::from_utf8_lossy(&self.src[start..end])
            .trim_end_matches('\r')
            .to_string();
        self.out.comments.push(Comment {
            pos: self.file.pos(start),
            text,
        });
    }

    fn peek(&self, n: usize) -> Option<u8> {
        self.src.get(self.off + n).copied()
    }

    fn line_end(&self, from: usize) -> usize {
        self.src[from..]
            .iter()
            .position(|b| *b == b'\n')
            .map(|i| from + i)
            .unwrap_or(self.src.len())
    }

    /// Skip blanks; newlines too unless one would terminate a statement.
    fn skip_space(&mut self, keep_newline: bool) {
        while let Some(&c) = self.src.get(self.off) {
            match c {
                b' ' | b'\t' | b'\r' => self.off += 1,
                b'\n' if !keep_newline => self.off += 1,
                _ => break,
            }
        }
    }

    fn ident(&mut self) -> Tok {
        let start = self.off;
        while self.off < self.src.len() && (is_letter(self.src[self.off]) || self.src[self.off].is_ascii_digit()) {
            self.off += 1;
        }
        let word = String::from_utf8_lossy(&self.src[start..self.off]).into_owned();
        Tok::keyword(&word).unwrap_or(Tok::Ident(word))
    }

    fn number(&mut self) -> Tok {
        let start = self.off;
        let mut float = false;

        if self.src[start] == b'0' && matches!(self.peek(1), Some(b'x' | b'X' | b'b' | b'B' | b'o' | b'O')) {
            self.off += 2;
            while self.off < self.src.len() && (self.src[self.off].is_ascii_hexdigit() || self.src[self.off] == b'_') {
                self.off += 1;
            }
        } else {
            self.digits();
            if self.src.get(self.off) == Some(&b'.') {
                float = true;
                self.off += 1;
                self.digits();
            }
            if matches!(self.src.get(self.off), Some(b'e' | b'E')) {
                float = true;
                self.off += 1;
                if matches!(self.src.get(self.off), Some(b'+' | b'-')) {
                    self.off += 1;
                }
                self.digits();
            }
        }

        let imag = self.src.get(self.off) == Some(&b'i');
        if imag {
            self.off += 1;
        }

        let text = String::from_utf8_lossy(&self.src[start..self.off]).into_owned();
        if imag {
            Tok::Imag(text)
        } else if float {
            Tok::Float(text)
        } else {
            Tok::Int(text)
        }
    }

    fn digits(&mut self) {
        while self.off < self.src.len() && (self.src[self.off].is_ascii_digit() || self.src[self.off] == b'_') {
            self.off += 1;
        }
    }

    fn quoted(&mut self, quote: u8, what: &str) -> String {
        let start = self.off;
        self.off += 1;
        loop {
            match self.src.get(self.off) {
                None | Some(b'\n') => {
                    self.error(start, format!("{what} literal not terminated"));
                    break;
                }
                Some(b'\\') => self.off += 2,
                Some(&c) if c == quote => {
                    self.off += 1;
                    break;
                }
                Some(_) => self.off += 1,
            }
        }
        self.off = self.off.min(self.src.len());
        String::from_utf8_lossy(&self.src[start..self.off]).into_owned()
    }

    fn string(&mut self) -> Tok {
        Tok::Str(self.quoted(b'"', "string"))
    }

    fn char_lit(&mut self) -> Tok {
        Tok::Char(self.quoted(b'\'', "rune"))
    }

    fn raw_string(&mut self) -> Tok {
        let start = self.off;
        match self.src[start + 1..].iter().position(|b| *b == b'`') {
            Some(i) => self.off = start + 1 + i + 1,
            None => {
                self.error(start, "raw string literal not terminated");
                self.off = self.src.len();
            }
        }
        Tok::Str(String::from_utf8_lossy(&self.src[start..self.off]).into_owned())
    }

    fn operator(&mut self) -> Tok {
        use BinaryOp as B;

        const TABLE: &[(&str, fn() -> Tok)] = &[
            ("&^=", || Tok::OpAssign(B::AndNot)),
            ("<<=", || Tok::OpAssign(B::Shl)),
            (">>=", || Tok::OpAssign(B::Shr)),
            ("...", || Tok::Ellipsis),
            ("&&", || Tok::Op(B::LogAnd)),
            ("||", || Tok::Op(B::LogOr)),
            ("<-", || Tok::Arrow),
            ("++", || Tok::Inc),
            ("--", || Tok::Dec),
            ("==", || Tok::Op(B::Eq)),
            ("!=", || Tok::Op(B::Ne)),
            ("<=", || Tok::Op(B::Le)),
            (">=", || Tok::Op(B::Ge)),
            (":=", || Tok::Define),
            ("<<", || Tok::Op(B::Shl)),
            (">>", || Tok::Op(B::Shr)),
            ("&^", || Tok::Op(B::AndNot)),
            ("+=", || Tok::OpAssign(B::Add)),
            ("-=", || Tok::OpAssign(B::Sub)),
            ("*=", || Tok::OpAssign(B::Mul)),
            ("/=", || Tok::OpAssign(B::Div)),
            ("%=", || Tok::OpAssign(B::Rem)),
            ("&=", || Tok::OpAssign(B::And)),
            ("|=", || Tok::OpAssign(B::Or)),
            ("^=", || Tok::OpAssign(B::Xor)),
            ("+", || Tok::Add),
            ("-", || Tok::Sub),
            ("*", || Tok::Mul),
            ("/", || Tok::Op(B::Div)),
            ("%", || Tok::Op(B::Rem)),
            ("&", || Tok::And),
            ("|", || Tok::Op(B::Or)),
            ("^", || Tok::Xor),
            ("<", || Tok::Op(B::Lt)),
            (">", || Tok::Op(B::Gt)),
            ("=", || Tok::Assign),
            ("!", || Tok::Not),
            ("(", || Tok::LParen),
            (")", || Tok::RParen),
            ("[", || Tok::LBrack),
            ("]", || Tok::RBrack),
            ("{", || Tok::LBrace),
            ("}", || Tok::RBrace),
            (",", || Tok::Comma),
            (".", || Tok::Period),
            (":", || Tok::Colon),
            (";", || Tok::Semi { auto: false }),
        ];

        let rest = &self.src[self.off..];
        for (text, make) in TABLE {
            if rest.starts_with(text.as_bytes()) {
                self.off += text.len();
                return make();
            }
        }

        let ch = std::str::from_utf8(rest)
            .ok()
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        let start = self.off;
        self.off += ch.len_utf8().max(1);
        self.error(start, format!("invalid character {ch:?}"));
        Tok::Illegal(ch)
    }
}

fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickfix_types::FileSet;

    fn lex(src: &str) -> Lexed {
        let mut fset = FileSet::new();
        let idx = fset.add_file("t.go", src);
        tokenize(fset.get(idx), src)
    }

    fn kinds(src: &str) -> Vec<Tok> {
        lex(src).tokens.into_iter().map(|t| t.tok).collect()
    }

    #[test]
    fn inserts_semicolon_after_identifier_at_newline() {
        assert_eq!(
            kinds("x\ny"),
            vec![
                Tok::Ident("x".into()),
                Tok::Semi { auto: true },
                Tok::Ident("y".into()),
                Tok::Semi { auto: true },
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn no_semicolon_after_operator() {
        assert_eq!(
            kinds("x +\ny"),
            vec![
                Tok::Ident("x".into()),
                Tok::Add,
                Tok::Ident("y".into()),
                Tok::Semi { auto: true },
                Tok::Eof,
            ]
        );
    }

    #[test]
    fn line_comment_is_collected_and_terminates_statement() {
        let lexed = lex("return // done\n}");
        assert_eq!(lexed.comments.len(), 1);
        assert_eq!(lexed.comments[0].text, "// done");
        let toks: Vec<_> = lexed.tokens.into_iter().map(|t| t.tok).collect();
        assert_eq!(
            toks,
            vec![Tok::Return, Tok::Semi { auto: true }, Tok::RBrace, Tok::Semi { auto: true }, Tok::Eof]
        );
    }

    #[test]
    fn operators_prefer_longest_match() {
        assert_eq!(
            kinds("a &^= b"),
            vec![
                Tok::Ident("a".into()),
                Tok::OpAssign(BinaryOp::AndNot),
                Tok::Ident("b".into()),
                Tok::Semi { auto: true },
                Tok::Eof,
            ]
        );
        assert_eq!(kinds(":=")[0], Tok::Define);
        assert_eq!(kinds("<-ch")[0], Tok::Arrow);
    }

    #[test]
    fn literals_keep_their_spelling() {
        let toks = kinds(r#""a\"b" `raw` 'x' 0x1F 1.5e3 2i"#);
        assert_eq!(toks[0], Tok::Str(r#""a\"b""#.into()));
        assert_eq!(toks[1], Tok::Str("`raw`".into()));
        assert_eq!(toks[2], Tok::Char("'x'".into()));
        assert_eq!(toks[3], Tok::Int("0x1F".into()));
        assert_eq!(toks[4], Tok::Float("1.5e3".into()));
        assert_eq!(toks[5], Tok::Imag("2i".into()));
    }

    #[test]
    fn unterminated_string_is_reported() {
        let lexed = lex("\"abc\n");
        assert_eq!(lexed.errors.len(), 1);
        assert!(lexed.errors[0].1.contains("not terminated"));
    }
}
