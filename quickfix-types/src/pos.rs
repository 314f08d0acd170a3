//! Global source positions.
//!
//! Modeled on a file set: each added file reserves `size + 1` positions
//! starting at its base, so the end-of-file position is still addressable and
//! no two files overlap.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// A global byte position. `Pos::NONE` (zero) means "no position".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos(u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    pub const fn new(raw: u32) -> Self {
        Pos(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Position `n` bytes after `self`.
    pub fn add(self, n: usize) -> Pos {
        Pos(self.0 + n as u32)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Half-open range `[lo, hi)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub lo: Pos,
    pub hi: Pos,
}

impl Span {
    pub const NONE: Span = Span {
        lo: Pos::NONE,
        hi: Pos::NONE,
    };

    pub fn new(lo: Pos, hi: Pos) -> Self {
        Self { lo, hi }
    }

    pub fn is_valid(self) -> bool {
        self.lo.is_valid()
    }

    pub fn contains(self, pos: Pos) -> bool {
        self.is_valid() && self.lo <= pos && pos < self.hi
    }

    /// Smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        if !self.is_valid() {
            return other;
        }
        if !other.is_valid() {
            return self;
        }
        Span {
            lo: self.lo.min(other.lo),
            hi: self.hi.max(other.hi),
        }
    }
}

/// A resolved, human-facing location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub filename: Utf8PathBuf,
    /// 1-based; 0 when unknown.
    pub line: usize,
    /// 1-based byte column; 0 when unknown.
    pub column: usize,
}

impl Position {
    pub fn is_valid(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("-");
        }
        write!(f, "{}:{}:{}", self.filename, self.line, self.column)
    }
}

/// One file's slice of the position space.
#[derive(Debug, Clone)]
pub struct SourceFile {
    name: Utf8PathBuf,
    base: u32,
    size: u32,
    /// Byte offsets of line starts; always begins with 0.
    lines: Vec<u32>,
}

impl SourceFile {
    pub fn name(&self) -> &Utf8Path {
        &self.name
    }

    pub fn base(&self) -> Pos {
        Pos(self.base)
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Every position owned by this file, end-of-file included.
    pub fn span(&self) -> Span {
        Span::new(Pos(self.base), Pos(self.base + self.size + 1))
    }

    pub fn pos(&self, offset: usize) -> Pos {
        Pos(self.base + offset as u32)
    }

    pub fn offset(&self, pos: Pos) -> usize {
        (pos.0 - self.base) as usize
    }

    pub fn line(&self, pos: Pos) -> usize {
        let off = self.offset(pos) as u32;
        match self.lines.binary_search(&off) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }

    pub fn position(&self, pos: Pos) -> Position {
        let line = self.line(pos);
        let start = self.lines[line - 1];
        Position {
            filename: self.name.clone(),
            line,
            column: (self.offset(pos) as u32 - start) as usize + 1,
        }
    }
}

/// All files of one compilation scope.
#[derive(Debug, Clone)]
pub struct FileSet {
    files: Vec<SourceFile>,
    next_base: u32,
}

impl Default for FileSet {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSet {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            next_base: 1,
        }
    }

    /// Reserve positions for `src` and return the new file's index.
    pub fn add_file(&mut self, name: impl Into<Utf8PathBuf>, src: &str) -> usize {
        let size = src.len() as u32;
        let mut lines = vec![0];
        lines.extend(
            src.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i as u32 + 1),
        );
        self.files.push(SourceFile {
            name: name.into(),
            base: self.next_base,
            size,
            lines,
        });
        self.next_base += size + 1;
        self.files.len() - 1
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn get(&self, index: usize) -> &SourceFile {
        &self.files[index]
    }

    pub fn file(&self, pos: Pos) -> Option<&SourceFile> {
        if !pos.is_valid() {
            return None;
        }
        self.files.iter().find(|f| f.span().contains(pos))
    }

    pub fn position(&self, pos: Pos) -> Position {
        match self.file(pos) {
            Some(f) => f.position(pos),
            None => Position {
                filename: Utf8PathBuf::new(),
                line: 0,
                column: 0,
            },
        }
    }

    /// Line of `pos` in its own file, 0 when unknown.
    pub fn line(&self, pos: Pos) -> usize {
        self.file(pos).map(|f| f.line(pos)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn files_get_disjoint_ranges() {
        let mut fset = FileSet::new();
        let a = fset.add_file("a.go", "package a\n");
        let b = fset.add_file("b.go", "package a\n\nvar x int\n");

        let a = fset.get(a).span();
        let b = fset.get(b).span();
        assert!(a.hi <= b.lo);
        assert_eq!(a.lo, Pos::new(1));
    }

    #[test]
    fn position_is_one_based() {
        let mut fset = FileSet::new();
        let a = fset.add_file("a.go", "package a\n\nfunc f() {\n\tx := 1\n}\n");
        let file = fset.get(a);
        let pos = file.pos(23);

        let p = fset.position(pos);
        assert_eq!(p.line, 4);
        assert_eq!(p.column, 2);
        assert_eq!(p.to_string(), "a.go:4:2");
    }

    #[test]
    fn end_of_file_resolves_to_its_file() {
        let mut fset = FileSet::new();
        fset.add_file("a.go", "package a");
        let b = fset.add_file("b.go", "package a");
        let eof = fset.get(0).pos(9);
        assert_eq!(fset.file(eof).map(|f| f.name().as_str()), Some("a.go"));
        assert_eq!(fset.file(fset.get(b).pos(0)).map(|f| f.name().as_str()), Some("b.go"));
    }

    #[test]
    fn unknown_position_renders_as_dash() {
        let fset = FileSet::new();
        assert_eq!(fset.position(Pos::NONE).to_string(), "-");
    }

    #[test]
    fn span_contains_is_half_open() {
        let s = Span::new(Pos::new(3), Pos::new(6));
        assert!(!s.contains(Pos::new(2)));
        assert!(s.contains(Pos::new(3)));
        assert!(s.contains(Pos::new(5)));
        assert!(!s.contains(Pos::new(6)));
        assert!(!Span::NONE.contains(Pos::NONE));
    }

    proptest::proptest! {
        #[test]
        fn line_and_column_match_a_naive_scan(
            src in "[a-z \n]{0,64}",
            offset in 0usize..=64,
        ) {
            let offset = offset.min(src.len());
            let mut fset = FileSet::new();
            fset.add_file("p.go", "package p\n");
            let i = fset.add_file("a.go", &src);
            let p = fset.position(fset.get(i).pos(offset));

            let before = &src[..offset];
            let line = before.matches('\n').count() + 1;
            let column = offset - before.rfind('\n').map_or(0, |n| n + 1) + 1;
            proptest::prop_assert_eq!(p.filename.as_str(), "a.go");
            proptest::prop_assert_eq!((p.line, p.column), (line, column));
        }
    }
}
