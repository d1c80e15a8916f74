//! Line-level text diff
//!
//! Longest-common-subsequence over lines, computed with a suffix table
//! after stripping the common prefix. When several minimal edit scripts
//! exist the walk takes a match as soon as one is available and prefers a
//! deletion over an insertion, so matching lines are aligned as early as
//! possible and output is stable for identical inputs.
//!
//! Lines are split with [`str::lines`]; a trailing newline does not count
//! as an extra line.

use std::time::{Duration, Instant};

use domain::{DiffResult, TextVersion};

use crate::error::ApplicationError;

pub const DEFAULT_CONTEXT_LINES: usize = 3;
pub const DEFAULT_MAX_TABLE_CELLS: usize = 25_000_000;

/// Edit operation for one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Equal,
    Delete,
    Insert,
}

impl LineOp {
    const fn prefix(self) -> char {
        match self {
            Self::Equal => ' ',
            Self::Delete => '-',
            Self::Insert => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub op: LineOp,
    pub text: String,
}

impl DiffLine {
    fn new(op: LineOp, text: &str) -> Self {
        Self {
            op,
            text: text.to_string(),
        }
    }
}

/// Point in time after which a running diff gives up
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    fn check(&self) -> Result<(), ApplicationError> {
        if Instant::now() >= self.at {
            return Err(ApplicationError::DiffTimeout {
                budget_ms: u64::try_from(self.budget.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }
}

/// Full edit script between two texts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineDiff {
    lines: Vec<DiffLine>,
    additions: u32,
    deletions: u32,
}

impl LineDiff {
    fn from_lines(lines: Vec<DiffLine>) -> Self {
        let count = |op| {
            let n = lines.iter().filter(|l| l.op == op).count();
            u32::try_from(n).unwrap_or(u32::MAX)
        };
        let additions = count(LineOp::Insert);
        let deletions = count(LineOp::Delete);
        Self {
            lines,
            additions,
            deletions,
        }
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub const fn additions(&self) -> u32 {
        self.additions
    }

    pub const fn deletions(&self) -> u32 {
        self.deletions
    }

    pub const fn is_unchanged(&self) -> bool {
        self.additions == 0 && self.deletions == 0
    }

    /// Render as unified-diff hunks with `context` surrounding lines
    ///
    /// Returns an empty string when nothing changed.
    pub fn to_unified(&self, context: usize) -> String {
        if self.is_unchanged() {
            return String::new();
        }

        let mut hunks: Vec<(usize, usize)> = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if line.op == LineOp::Equal {
                continue;
            }
            let start = idx.saturating_sub(context);
            let end = (idx + context + 1).min(self.lines.len());
            match hunks.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => hunks.push((start, end)),
            }
        }

        // old/new line counts consumed before each edit
        let mut old_before = Vec::with_capacity(self.lines.len());
        let mut new_before = Vec::with_capacity(self.lines.len());
        let (mut old_seen, mut new_seen) = (0usize, 0usize);
        for line in &self.lines {
            old_before.push(old_seen);
            new_before.push(new_seen);
            match line.op {
                LineOp::Equal => {
                    old_seen += 1;
                    new_seen += 1;
                },
                LineOp::Delete => old_seen += 1,
                LineOp::Insert => new_seen += 1,
            }
        }

        let mut out = String::new();
        for (start, end) in hunks {
            let slice = &self.lines[start..end];
            let old_len = slice.iter().filter(|l| l.op != LineOp::Insert).count();
            let new_len = slice.iter().filter(|l| l.op != LineOp::Delete).count();
            let old_start = old_before[start] + usize::from(old_len > 0);
            let new_start = new_before[start] + usize::from(new_len > 0);

            out.push_str(&format!(
                "@@ -{old_start},{old_len} +{new_start},{new_len} @@\n"
            ));
            for line in slice {
                out.push(line.op.prefix());
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }
}

/// Pure line diff engine
#[derive(Debug, Clone, Copy)]
pub struct TextDiffEngine {
    context_lines: usize,
    max_table_cells: usize,
}

impl Default for TextDiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES, DEFAULT_MAX_TABLE_CELLS)
    }
}

impl TextDiffEngine {
    pub const fn new(context_lines: usize, max_table_cells: usize) -> Self {
        Self {
            context_lines,
            max_table_cells,
        }
    }

    pub const fn context_lines(&self) -> usize {
        self.context_lines
    }

    /// Diff two texts without a time limit
    pub fn diff(&self, source: &str, target: &str) -> Result<LineDiff, ApplicationError> {
        self.run(source, target, None)
    }

    /// Diff two texts, giving up with `DiffTimeout` once `deadline` passes
    pub fn diff_with_deadline(
        &self,
        source: &str,
        target: &str,
        deadline: &Deadline,
    ) -> Result<LineDiff, ApplicationError> {
        self.run(source, target, Some(deadline))
    }

    /// Diff two recorded versions into a [`DiffResult`]
    pub fn diff_versions(
        &self,
        source: &TextVersion,
        target: &TextVersion,
        deadline: Option<&Deadline>,
    ) -> Result<DiffResult, ApplicationError> {
        let diff = self.run(source.content(), target.content(), deadline)?;
        Ok(DiffResult {
            source_version: source.reference(),
            target_version: target.reference(),
            unified_diff: diff.to_unified(self.context_lines),
            additions: diff.additions(),
            deletions: diff.deletions(),
        })
    }

    fn run(
        &self,
        source: &str,
        target: &str,
        deadline: Option<&Deadline>,
    ) -> Result<LineDiff, ApplicationError> {
        let a: Vec<&str> = source.lines().collect();
        let b: Vec<&str> = target.lines().collect();

        let prefix = a.iter().zip(&b).take_while(|(x, y)| x == y).count();
        let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);

        let cells = (a_rest.len() + 1).saturating_mul(b_rest.len() + 1);
        if cells > self.max_table_cells {
            return Err(ApplicationError::DiffTooLarge(format!(
                "{} x {} differing lines exceed the comparison limit",
                a_rest.len(),
                b_rest.len()
            )));
        }

        let mut lines = Vec::with_capacity(a.len() + b_rest.len());
        lines.extend(a[..prefix].iter().map(|l| DiffLine::new(LineOp::Equal, l)));
        walk(a_rest, b_rest, &lcs_table(a_rest, b_rest, deadline)?, &mut lines);

        Ok(LineDiff::from_lines(lines))
    }
}

/// `table[i * (m + 1) + j]` = LCS length of `a[i..]` and `b[j..]`
fn lcs_table(a: &[&str], b: &[&str], deadline: Option<&Deadline>) -> Result<Vec<u32>, ApplicationError> {
    let width = b.len() + 1;
    let mut table = vec![0u32; (a.len() + 1) * width];

    for i in (0..a.len()).rev() {
        if let Some(deadline) = deadline {
            deadline.check()?;
        }
        for j in (0..b.len()).rev() {
            table[i * width + j] = if a[i] == b[j] {
                table[(i + 1) * width + j + 1] + 1
            } else {
                table[(i + 1) * width + j].max(table[i * width + j + 1])
            };
        }
    }
    Ok(table)
}

fn walk(a: &[&str], b: &[&str], table: &[u32], out: &mut Vec<DiffLine>) {
    let width = b.len() + 1;
    let at = |i: usize, j: usize| table[i * width + j];
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i] == b[j] {
            out.push(DiffLine::new(LineOp::Equal, a[i]));
            i += 1;
            j += 1;
        } else if at(i + 1, j) >= at(i, j + 1) {
            out.push(DiffLine::new(LineOp::Delete, a[i]));
            i += 1;
        } else {
            out.push(DiffLine::new(LineOp::Insert, b[j]));
            j += 1;
        }
    }
    out.extend(a[i..].iter().map(|l| DiffLine::new(LineOp::Delete, l)));
    out.extend(b[j..].iter().map(|l| DiffLine::new(LineOp::Insert, l)));
}
