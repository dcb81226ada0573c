use crate::error::{AssemblerError, Result};
use nextedit_code_chunker::ChunkerConfig;
use nextedit_search::Bm25Params;
use nextedit_snapshot_store::SnapshotConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Every knob of the context builder. All fields are optional in TOML.
///
/// ```toml
/// max_supplemental_context = 3
/// max_total_chars = 8192
/// cross_file_enabled = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    // Snapshot history
    pub max_files: usize,
    pub max_storage_size_kb: usize,
    pub debounce_interval_ms: u64,
    pub max_age_ms: u64,

    // Budgets
    pub max_supplemental_context: usize,
    pub max_item_chars: usize,
    pub max_total_chars: usize,

    // Retrieval
    pub chunk_line_size: usize,
    pub bm25_top_k: usize,
    pub bm25_k1: f64,
    pub bm25_b: f64,
    pub max_candidate_files: usize,
    pub focal_segment_chars: usize,
    pub diff_context_lines: usize,
    pub resolution_timeout_ms: u64,

    // Strategies
    pub edit_history_enabled: bool,
    pub cross_file_enabled: bool,
    pub focal_file_enabled: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        let snapshots = SnapshotConfig::default();
        let bm25 = Bm25Params::default();
        Self {
            max_files: snapshots.max_files,
            max_storage_size_kb: snapshots.max_storage_size_kb,
            debounce_interval_ms: snapshots.debounce_interval_ms,
            max_age_ms: snapshots.max_age_ms,
            max_supplemental_context: 5,
            max_item_chars: 10_240,
            max_total_chars: 20_480,
            chunk_line_size: 50,
            bm25_top_k: 3,
            bm25_k1: bm25.k1,
            bm25_b: bm25.b,
            max_candidate_files: 10,
            focal_segment_chars: 10_200,
            diff_context_lines: 3,
            resolution_timeout_ms: 100,
            edit_history_enabled: true,
            cross_file_enabled: true,
            focal_file_enabled: true,
        }
    }
}

impl ContextConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("Loaded context config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.snapshot_config()
            .validate()
            .map_err(AssemblerError::InvalidConfig)?;
        if self.chunk_line_size == 0 {
            return Err(invalid("chunk_line_size must be > 0"));
        }
        if self.bm25_top_k == 0 {
            return Err(invalid("bm25_top_k must be > 0"));
        }
        if self.max_supplemental_context == 0 {
            return Err(invalid("max_supplemental_context must be > 0"));
        }
        if self.max_item_chars == 0 || self.max_total_chars == 0 {
            return Err(invalid("max_item_chars and max_total_chars must be > 0"));
        }
        if self.max_item_chars > self.max_total_chars {
            return Err(invalid(format!(
                "max_item_chars ({}) exceeds max_total_chars ({})",
                self.max_item_chars, self.max_total_chars
            )));
        }
        if !(self.bm25_k1 >= 0.0 && (0.0..=1.0).contains(&self.bm25_b)) {
            return Err(invalid("bm25_k1 must be >= 0 and bm25_b within [0, 1]"));
        }
        Ok(())
    }

    pub const fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig {
            max_files: self.max_files,
            max_storage_size_kb: self.max_storage_size_kb,
            debounce_interval_ms: self.debounce_interval_ms,
            max_age_ms: self.max_age_ms,
        }
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig::with_chunk_lines(self.chunk_line_size)
    }

    pub const fn bm25_params(&self) -> Bm25Params {
        Bm25Params {
            k1: self.bm25_k1,
            b: self.bm25_b,
        }
    }

    pub const fn resolution_timeout(&self) -> Duration {
        Duration::from_millis(self.resolution_timeout_ms)
    }
}

fn invalid(msg: impl Into<String>) -> AssemblerError {
    AssemblerError::InvalidConfig(msg.into())
}
