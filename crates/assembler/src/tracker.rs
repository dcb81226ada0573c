use crate::assembler::{ContextAssembler, ContextRequest};
use crate::config::ContextConfig;
use crate::error::Result;
use crate::strategy::Strategy;
use crate::workspace::Workspace;
use nextedit_protocol::SupplementalContext;
use nextedit_snapshot_store::{BlobStore, LoadedSnapshot, RestoreStats, SnapshotTracker};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Owns the edit history and the assembler for one editor session.
///
/// Construct one per session and share it behind an `Arc`; edits and
/// requests may arrive from any task.
pub struct PredictionTracker {
    snapshots: Mutex<SnapshotTracker>,
    assembler: ContextAssembler,
}

impl PredictionTracker {
    /// History kept in memory only
    pub fn new(config: ContextConfig) -> Result<Self> {
        let snapshots = SnapshotTracker::in_memory(config.snapshot_config());
        Self::from_parts(config, snapshots)
    }

    /// History bodies persisted in `blobs`
    pub fn with_blob_store(config: ContextConfig, blobs: Arc<dyn BlobStore>) -> Result<Self> {
        let snapshots = SnapshotTracker::with_blob_store(config.snapshot_config(), blobs);
        Self::from_parts(config, snapshots)
    }

    fn from_parts(config: ContextConfig, snapshots: SnapshotTracker) -> Result<Self> {
        Ok(Self {
            assembler: ContextAssembler::new(config)?,
            snapshots: Mutex::new(snapshots),
        })
    }

    pub const fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    /// Rebuild history from persisted bodies
    pub async fn restore(&self, now_ms: u64) -> RestoreStats {
        self.snapshots.lock().await.restore(now_ms).await
    }

    /// Called on every edit with the content from before the edit.
    /// Returns whether a snapshot was taken.
    pub async fn on_edit(&self, file_path: &str, prior_content: &str, now_ms: u64) -> bool {
        self.snapshots
            .lock()
            .await
            .record(file_path, prior_content, now_ms)
            .await
    }

    /// History of `file_path`, oldest first
    pub async fn history(&self, file_path: &str, now_ms: u64) -> Vec<LoadedSnapshot> {
        self.snapshots.lock().await.snapshots(file_path, now_ms).await
    }

    pub async fn tracked_files(&self) -> Vec<String> {
        self.snapshots.lock().await.store().tracked_files()
    }

    pub async fn context_for(
        &self,
        request: &ContextRequest,
        workspace: &dyn Workspace,
    ) -> SupplementalContext {
        let wants_history = matches!(
            self.assembler.strategy_for(&request.file_path),
            Strategy::Neighbors {
                edit_history: true,
                ..
            }
        );
        let history = if wants_history {
            self.history(&request.file_path, request.now_ms).await
        } else {
            Vec::new()
        };
        self.assembler.assemble(request, &history, workspace).await
    }

    pub async fn clear(&self) {
        self.snapshots.lock().await.clear().await;
    }
}
