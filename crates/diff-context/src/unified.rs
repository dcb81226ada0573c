use similar::{ChangeTag, DiffOp, TextDiff};
use std::fmt::Write as _;
use std::ops::Range;

pub const DEFAULT_CONTEXT_LINES: usize = 3;

const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// A rendered unified diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// File headers followed by hunks
    pub text: String,
    /// Inserted plus deleted lines
    pub changed_lines: usize,
    pub hunks: usize,
}

impl FileDiff {
    pub const fn is_unchanged(&self) -> bool {
        self.changed_lines == 0
    }
}

/// Unified diff of two text blobs.
///
/// The file headers carry the snapshot timestamps where a file diff would
/// carry modification times:
///
/// ```text
/// --- src/A.ts	1000
/// +++ src/A.ts	5000
/// @@ -1,1 +1,1 @@
/// -foo
/// +foobarbaz
/// ```
pub fn build_diff(
    old_path: &str,
    new_path: &str,
    old_content: &str,
    new_content: &str,
    old_timestamp: u64,
    new_timestamp: u64,
    context_lines: usize,
) -> FileDiff {
    let diff = TextDiff::from_lines(old_content, new_content);

    let mut text = String::new();
    let _ = writeln!(text, "--- {old_path}\t{old_timestamp}");
    let _ = writeln!(text, "+++ {new_path}\t{new_timestamp}");

    let mut changed_lines = 0;
    let groups = diff.grouped_ops(context_lines);
    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_range = first.old_range().start..last.old_range().end;
        let new_range = first.new_range().start..last.new_range().end;
        let _ = writeln!(
            text,
            "@@ -{} +{} @@",
            hunk_range(&old_range),
            hunk_range(&new_range)
        );

        for op in group {
            changed_lines += write_op(&mut text, &diff, op);
        }
    }

    FileDiff {
        text,
        changed_lines,
        hunks: groups.len(),
    }
}

fn write_op<'old, 'new, 'bufs>(
    out: &mut String,
    diff: &TextDiff<'old, 'new, 'bufs, str>,
    op: &DiffOp,
) -> usize {
    let mut changed = 0;
    for change in diff.iter_changes(op) {
        let sign = match change.tag() {
            ChangeTag::Equal => ' ',
            ChangeTag::Delete => {
                changed += 1;
                '-'
            }
            ChangeTag::Insert => {
                changed += 1;
                '+'
            }
        };
        out.push(sign);
        out.push_str(change.value());
        if change.missing_newline() {
            out.push('\n');
            out.push_str(NO_NEWLINE_MARKER);
            out.push('\n');
        }
    }
    changed
}

/// `start,len` with a 1-based start; an empty range names the line before it.
fn hunk_range(range: &Range<usize>) -> String {
    let len = range.end - range.start;
    let start = if len == 0 { range.start } else { range.start + 1 };
    format!("{start},{len}")
}
