use crate::config::ContextConfig;
use crate::cross_file::{CrossFileRetriever, CursorQuery};
use crate::deadline::{Deadline, DeadlineExceeded};
use crate::error::Result;
use crate::focal::resolve_focal_file;
use crate::strategy::Strategy;
use crate::truncate::{truncate_items, Budget};
use crate::workspace::Workspace;
use nextedit_code_chunker::LineChunker;
use nextedit_diff::DiffContextBuilder;
use nextedit_protocol::{ContextItem, SupplementalContext};
use nextedit_snapshot_store::LoadedSnapshot;
use std::future::Future;
use tokio::time::Instant;

/// A prediction request for the active buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRequest {
    pub file_path: String,
    /// Live buffer content
    pub content: String,
    /// Cursor line, 0-indexed
    pub line: usize,
    /// Cursor column in characters, 0-indexed
    pub column: usize,
    /// Request time in milliseconds, same clock as the snapshots
    pub now_ms: u64,
}

impl ContextRequest {
    pub fn new(
        file_path: impl Into<String>,
        content: impl Into<String>,
        line: usize,
        column: usize,
        now_ms: u64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
            line,
            column,
            now_ms,
        }
    }

    /// Cursor at the very end of `content`; after a trailing newline that is
    /// column 0 of the empty last line.
    pub fn at_end(file_path: impl Into<String>, content: impl Into<String>, now_ms: u64) -> Self {
        let content = content.into();
        let line = content.matches('\n').count();
        let column = content.rsplit('\n').next().map_or(0, |l| l.chars().count());
        Self::new(file_path, content, line, column, now_ms)
    }

    fn cursor(&self) -> CursorQuery<'_> {
        CursorQuery {
            file_path: &self.file_path,
            content: &self.content,
            line: self.line,
            column: self.column,
        }
    }
}

/// Builds the supplemental context for one request at a time.
///
/// Every source failure (timeouts, unreadable files) is logged and contributes
/// nothing; [`ContextAssembler::assemble`] itself cannot fail.
pub struct ContextAssembler {
    config: ContextConfig,
    diff: DiffContextBuilder,
    cross_file: CrossFileRetriever,
}

impl ContextAssembler {
    pub fn new(config: ContextConfig) -> Result<Self> {
        config.validate()?;
        let chunker = LineChunker::new(config.chunker_config())?;
        let cross_file = CrossFileRetriever::new(
            chunker,
            config.bm25_params(),
            config.bm25_top_k,
            config.max_candidate_files,
        );
        Ok(Self {
            diff: DiffContextBuilder::new(config.diff_context_lines),
            cross_file,
            config,
        })
    }

    pub const fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn strategy_for(&self, file_path: &str) -> Strategy {
        Strategy::select(file_path, &self.config)
    }

    pub const fn budget(&self) -> Budget {
        Budget {
            max_item_chars: self.config.max_item_chars,
            max_items: self.config.max_supplemental_context,
            max_total_chars: self.config.max_total_chars,
        }
    }

    /// Assemble context for `request`. `history` holds the active file's
    /// snapshots, oldest first.
    pub async fn assemble(
        &self,
        request: &ContextRequest,
        history: &[LoadedSnapshot],
        workspace: &dyn Workspace,
    ) -> SupplementalContext {
        let started = Instant::now();
        let strategy = self.strategy_for(&request.file_path);
        let deadline = Deadline::after(self.config.resolution_timeout());
        let mut timed_out = false;

        let items = match strategy {
            Strategy::Disabled => Vec::new(),
            Strategy::FocalFile { language } => {
                let resolution = resolve_focal_file(
                    workspace,
                    &request.file_path,
                    &request.content,
                    language,
                    &deadline,
                );
                match self.within_timeout(resolution).await {
                    Ok(Some(found)) => vec![found.into_item(self.config.focal_segment_chars)],
                    Ok(None) => Vec::new(),
                    Err(DeadlineExceeded) => {
                        log::warn!("Focal file resolution for {} timed out", request.file_path);
                        timed_out = true;
                        Vec::new()
                    }
                }
            }
            Strategy::Neighbors {
                edit_history,
                cross_file,
            } => {
                let mut items = if edit_history {
                    self.history_items(request, history)
                } else {
                    Vec::new()
                };
                if cross_file {
                    let retrieval =
                        self.cross_file.retrieve(workspace, request.cursor(), &deadline);
                    match self.within_timeout(retrieval).await {
                        Ok(found) => items.extend(found),
                        Err(DeadlineExceeded) => {
                            log::warn!("Cross-file retrieval for {} timed out", request.file_path);
                            timed_out = true;
                        }
                    }
                }
                items
            }
        };

        let (items, truncation) = truncate_items(items, &self.budget());
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut context = SupplementalContext::new(items, strategy.kind(), timed_out, latency_ms);
        context.truncation = truncation;

        log::debug!(
            "Context for {}: strategy {:?}, {} items, {} chars, {:?} in {latency_ms}ms",
            request.file_path,
            context.strategy,
            context.items.len(),
            context.content_length,
            context.outcome
        );
        context
    }

    /// Diffs against the live buffer, newest snapshot first. Snapshots equal
    /// to the buffer would only produce empty diffs and are skipped.
    fn history_items(
        &self,
        request: &ContextRequest,
        history: &[LoadedSnapshot],
    ) -> Vec<ContextItem> {
        let changed: Vec<LoadedSnapshot> = history
            .iter()
            .filter(|snapshot| snapshot.content != request.content)
            .cloned()
            .collect();
        self.diff
            .build_contexts_for_file(&request.file_path, &request.content, &changed, request.now_ms)
    }

    async fn within_timeout<T>(
        &self,
        work: impl Future<Output = std::result::Result<T, DeadlineExceeded>>,
    ) -> std::result::Result<T, DeadlineExceeded> {
        match tokio::time::timeout(self.config.resolution_timeout(), work).await {
            Ok(result) => result,
            Err(_) => Err(DeadlineExceeded),
        }
    }
}
