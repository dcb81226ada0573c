//! # Next-Edit Diff Context
//!
//! Turns the snapshot history of a file into `PriorEditorState` context items:
//! one unified diff per snapshot, always against the live buffer.
//!
//! ```text
//! snapshots (oldest first)        current buffer
//!   t1 ─┐                               │
//!   t2 ─┼── diff(ti, now) ◄─────────────┘
//!   t3 ─┘
//!
//! items: [diff(t3), diff(t2), diff(t1)]   (newest first)
//! ```

mod unified;

pub use unified::{build_diff, FileDiff, DEFAULT_CONTEXT_LINES};

use nextedit_protocol::{ContextItem, ContextKind};
use nextedit_snapshot_store::LoadedSnapshot;

/// Builds diff context items for the same-file edit-history strategy
#[derive(Debug, Clone, Copy)]
pub struct DiffContextBuilder {
    context_lines: usize,
}

impl Default for DiffContextBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}

impl DiffContextBuilder {
    pub const fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    pub const fn context_lines(&self) -> usize {
        self.context_lines
    }

    #[allow(clippy::too_many_arguments)]
    pub fn build_diff(
        &self,
        old_path: &str,
        new_path: &str,
        old_content: &str,
        new_content: &str,
        old_timestamp: u64,
        new_timestamp: u64,
    ) -> FileDiff {
        build_diff(
            old_path,
            new_path,
            old_content,
            new_content,
            old_timestamp,
            new_timestamp,
            self.context_lines,
        )
    }

    /// One item per snapshot, newest snapshot first, each diffed against
    /// `current_content`. Empty diffs are kept; callers decide what to drop.
    pub fn build_contexts_for_file(
        &self,
        file_path: &str,
        current_content: &str,
        snapshots: &[LoadedSnapshot],
        now: u64,
    ) -> Vec<ContextItem> {
        let items: Vec<ContextItem> = snapshots
            .iter()
            .rev()
            .map(|snapshot| {
                let diff = self.build_diff(
                    file_path,
                    file_path,
                    &snapshot.content,
                    current_content,
                    snapshot.timestamp_ms,
                    now,
                );
                ContextItem::new(file_path, diff.text, ContextKind::PriorEditorState)
                    .with_time_offset(now.saturating_sub(snapshot.timestamp_ms))
            })
            .collect();
        log::debug!("Built {} diff contexts for {file_path}", items.len());
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn snapshot(ts: u64, content: &str) -> LoadedSnapshot {
        LoadedSnapshot {
            file_path: "A.ts".to_string(),
            timestamp_ms: ts,
            content: content.to_string(),
        }
    }

    #[test]
    fn contexts_are_newest_first_against_current_content() {
        let builder = DiffContextBuilder::default();
        let snapshots = vec![
            snapshot(1000, "a\n"),
            snapshot(2000, "a\nb\n"),
            snapshot(3000, "a\nb\nc\n"),
        ];
        let current = "a\nb\nc\nd\n";

        let items = builder.build_contexts_for_file("A.ts", current, &snapshots, 5000);

        let offsets: Vec<Option<u64>> = items.iter().map(|i| i.metadata.time_offset_ms).collect();
        assert_eq!(offsets, vec![Some(2000), Some(3000), Some(4000)]);
        for (item, snap) in items.iter().zip(snapshots.iter().rev()) {
            let expected = builder.build_diff(
                "A.ts",
                "A.ts",
                &snap.content,
                current,
                snap.timestamp_ms,
                5000,
            );
            assert_eq!(item.content, expected.text);
            assert_eq!(item.kind, ContextKind::PriorEditorState);
            assert_eq!(item.file_path, "A.ts");
        }
        // Oldest snapshot differs from current by three added lines, not one
        assert!(items[2].content.contains("+b\n+c\n+d\n"));
        assert!(items[0].content.contains("+d\n"));
        assert!(!items[0].content.contains("+b\n"));
    }

    #[test]
    fn identical_snapshot_still_yields_an_item() {
        let builder = DiffContextBuilder::new(3);
        let items = builder.build_contexts_for_file("A.ts", "same\n", &[snapshot(1, "same\n")], 10);
        assert_eq!(items.len(), 1);
        assert!(!items[0].content.contains("@@"));
    }

    #[test]
    fn no_snapshots_no_items() {
        let builder = DiffContextBuilder::default();
        assert!(builder.build_contexts_for_file("A.ts", "x", &[], 10).is_empty());
    }
}
