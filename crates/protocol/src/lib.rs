use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CONTEXT_SCHEMA_VERSION: u32 = 1;

/// Discriminates where a context item came from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Unified diff between a prior snapshot and the live buffer
    PriorEditorState,
    /// Continuation chunk from another file ranked by BM25
    CrossFileChunk,
    /// Leading slice of the source file a test file exercises
    FocalFile,
}

impl ContextKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriorEditorState => "prior_editor_state",
            Self::CrossFileChunk => "cross_file_chunk",
            Self::FocalFile => "focal_file",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct ContextMetadata {
    /// Milliseconds between the snapshot and the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset_ms: Option<u64>,

    /// Relevance score for ranked chunks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// One unit of supplemental context handed to a prediction request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ContextItem {
    pub file_path: String,
    pub content: String,
    pub kind: ContextKind,
    #[serde(default)]
    pub metadata: ContextMetadata,
}

impl ContextItem {
    pub fn new(
        file_path: impl Into<String>,
        content: impl Into<String>,
        kind: ContextKind,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            content: content.into(),
            kind,
            metadata: ContextMetadata::default(),
        }
    }

    #[must_use]
    pub fn with_time_offset(mut self, offset_ms: u64) -> Self {
        self.metadata.time_offset_ms = Some(offset_ms);
        self
    }

    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.metadata.score = Some(score);
        self
    }

    /// Content length in characters, the unit every budget is expressed in.
    pub fn content_chars(&self) -> usize {
        self.content.chars().count()
    }
}

/// Strategy the assembler picked for a request.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    FocalFile,
    EditHistory,
    CrossFile,
    EditHistoryAndCrossFile,
    Disabled,
}

/// How the request ended. Callers treat every outcome as "use `items`";
/// the distinction only matters for diagnostics.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContextOutcome {
    Found,
    Empty,
    TimedOut,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTruncation {
    MaxItemChars,
    MaxItems,
    MaxTotalChars,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct SupplementalContext {
    pub schema_version: u32,
    pub items: Vec<ContextItem>,
    pub strategy: StrategyKind,
    pub outcome: ContextOutcome,
    pub latency_ms: u64,
    /// Total characters across `items`
    pub content_length: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub truncation: Vec<BudgetTruncation>,
}

impl SupplementalContext {
    pub fn new(
        items: Vec<ContextItem>,
        strategy: StrategyKind,
        timed_out: bool,
        latency_ms: u64,
    ) -> Self {
        let content_length = items.iter().map(ContextItem::content_chars).sum();
        let outcome = if timed_out {
            ContextOutcome::TimedOut
        } else if items.is_empty() {
            ContextOutcome::Empty
        } else {
            ContextOutcome::Found
        };
        Self {
            schema_version: CONTEXT_SCHEMA_VERSION,
            items,
            strategy,
            outcome,
            latency_ms,
            content_length,
            truncation: Vec::new(),
        }
    }

    pub fn empty(strategy: StrategyKind) -> Self {
        Self::new(Vec::new(), strategy, false, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
