//! Elastic column alignment for printer output.
//!
//! The printer separates alignable cells with `\v`. Consecutive lines with
//! the same indentation that all have a terminated cell in a column form a
//! block; every cell of that block is padded to the widest one plus a single
//! space. Blocks nest: column `k + 1` is only aligned within a block of
//! column `k`. A column whose cells are all empty takes no space.

const CELL: char = '\u{0b}';

struct Line<'a> {
    indent: usize,
    cells: Vec<&'a str>,
}

impl Line<'_> {
    /// Number of cells terminated by a separator.
    fn terminated(&self) -> usize {
        self.cells.len() - 1
    }
}

pub(crate) fn align(text: &str) -> String {
    let lines: Vec<Line<'_>> = text
        .split('\n')
        .map(|raw| {
            let rest = raw.trim_start_matches('\t');
            Line {
                indent: raw.len() - rest.len(),
                cells: rest.split(CELL).collect(),
            }
        })
        .collect();

    let mut widths: Vec<Vec<usize>> = lines.iter().map(|l| vec![0; l.terminated()]).collect();
    format(&lines, 0, 0, lines.len(), &mut widths);

    let mut out = String::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let start = out.len();
        for _ in 0..line.indent {
            out.push('\t');
        }
        let last = line.cells.len() - 1;
        for (k, cell) in line.cells.iter().enumerate() {
            out.push_str(cell);
            if k < last {
                let width = widths[i][k];
                let used = cell.chars().count();
                for _ in used..width {
                    out.push(' ');
                }
            }
        }
        if line.cells[last].is_empty() && out.len() > start {
            let trimmed = out.trim_end_matches(' ').len().max(start);
            out.truncate(trimmed);
        }
    }
    out
}

fn format(lines: &[Line<'_>], column: usize, lo: usize, hi: usize, widths: &mut [Vec<usize>]) {
    let mut i = lo;
    while i < hi {
        if lines[i].terminated() <= column {
            i += 1;
            continue;
        }

        let start = i;
        let indent = lines[i].indent;
        let mut widest = 0;
        while i < hi && lines[i].terminated() > column && lines[i].indent == indent {
            widest = widest.max(lines[i].cells[column].chars().count());
            i += 1;
        }

        let width = if widest == 0 { 0 } else { widest + 1 };
        for row in widths.iter_mut().take(i).skip(start) {
            row[column] = width;
        }
        format(lines, column + 1, start, i, widths);
    }
}
