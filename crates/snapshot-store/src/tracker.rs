use crate::blob::BlobStore;
use crate::config::SnapshotConfig;
use crate::snapshot::{parse_storage_key, storage_key, LoadedSnapshot, Snapshot, SnapshotBody};
use crate::store::SnapshotStore;
use std::sync::Arc;

/// Outcome of rebuilding the index from persisted bodies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreStats {
    pub restored: usize,
    /// Keys with unparsable metadata, deleted from storage
    pub discarded: usize,
    /// Bodies that could not be read
    pub unreadable: usize,
    /// Restored snapshots dropped again by expiry or size limits
    pub evicted: usize,
}

/// Snapshot store plus optional persistence of snapshot bodies.
///
/// Storage failures are logged and never surface to the edit path: a body
/// that cannot be written is simply not retained, a body that cannot be read
/// is skipped.
pub struct SnapshotTracker {
    store: SnapshotStore,
    blobs: Option<Arc<dyn BlobStore>>,
}

impl SnapshotTracker {
    pub fn in_memory(config: SnapshotConfig) -> Self {
        Self {
            store: SnapshotStore::new(config),
            blobs: None,
        }
    }

    pub fn with_blob_store(config: SnapshotConfig, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            store: SnapshotStore::new(config),
            blobs: Some(blobs),
        }
    }

    pub const fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub const fn is_persistent(&self) -> bool {
        self.blobs.is_some()
    }

    /// Record `prior_content` for `file_path` if the debounce allows, then
    /// enforce every limit. Returns whether a snapshot was retained.
    pub async fn record(&mut self, file_path: &str, prior_content: &str, now: u64) -> bool {
        if !self.store.should_record(file_path, now) {
            log::debug!("Skipping snapshot of {file_path}: debounced");
            return false;
        }

        let snapshot = match &self.blobs {
            None => Snapshot::inline(file_path, prior_content.to_string(), now),
            Some(blobs) => {
                let key = storage_key(file_path, now);
                if let Err(err) = blobs.put(&key, prior_content).await {
                    log::warn!("Failed to persist snapshot of {file_path}: {err}");
                    return false;
                }
                Snapshot::stored(file_path, key, prior_content.len(), now)
            }
        };
        self.store.insert(snapshot);

        let removed = self.store.enforce(now);
        let retained = self
            .store
            .get(file_path)
            .iter()
            .any(|s| s.timestamp_ms == now);
        self.release(removed).await;
        log::debug!(
            "Recorded snapshot of {file_path} at {now} ({} files, {} bytes)",
            self.store.tracked_files().len(),
            self.store.total_size()
        );
        retained
    }

    /// Loaded snapshots of `file_path`, oldest first, after an expiry sweep.
    pub async fn snapshots(&mut self, file_path: &str, now: u64) -> Vec<LoadedSnapshot> {
        let max_age_ms = self.store.config().max_age_ms;
        let expired = self.store.expire_older_than(now, max_age_ms);
        self.release(expired).await;

        let mut loaded = Vec::with_capacity(self.store.get(file_path).len());
        for snapshot in self.store.get(file_path) {
            let content = match &snapshot.body {
                SnapshotBody::Inline(text) => text.clone(),
                SnapshotBody::Stored { key } => {
                    let Some(blobs) = &self.blobs else {
                        continue;
                    };
                    match blobs.get(key).await {
                        Ok(text) => text,
                        Err(err) => {
                            log::warn!("Skipping unreadable snapshot {key} of {file_path}: {err}");
                            continue;
                        }
                    }
                }
            };
            loaded.push(LoadedSnapshot {
                file_path: snapshot.file_path.clone(),
                timestamp_ms: snapshot.timestamp_ms,
                content,
            });
        }
        loaded
    }

    /// Rebuild the index from persisted bodies, e.g. after a restart.
    pub async fn restore(&mut self, now: u64) -> RestoreStats {
        let mut stats = RestoreStats::default();
        let Some(blobs) = self.blobs.clone() else {
            return stats;
        };

        let keys = match blobs.keys().await {
            Ok(keys) => keys,
            Err(err) => {
                log::warn!("Cannot list persisted snapshots: {err}");
                return stats;
            }
        };

        for key in keys {
            let (file_path, timestamp_ms) = match parse_storage_key(&key) {
                Ok(parsed) => parsed,
                Err(err) => {
                    log::warn!("Discarding snapshot with malformed key: {err}");
                    if let Err(err) = blobs.delete(&key).await {
                        log::warn!("Failed to delete snapshot {key}: {err}");
                    }
                    stats.discarded += 1;
                    continue;
                }
            };
            if self
                .store
                .get(&file_path)
                .iter()
                .any(|s| s.timestamp_ms == timestamp_ms)
            {
                continue;
            }
            let size = match blobs.get(&key).await {
                Ok(text) => text.len(),
                Err(err) => {
                    log::warn!("Skipping unreadable snapshot {key}: {err}");
                    stats.unreadable += 1;
                    continue;
                }
            };
            self.store
                .insert(Snapshot::stored(file_path, key, size, timestamp_ms));
            stats.restored += 1;
        }

        let removed = self.store.enforce(now);
        stats.evicted = removed.len();
        stats.restored = stats.restored.saturating_sub(stats.evicted);
        self.release(removed).await;

        log::info!(
            "Restored {} snapshots ({} discarded, {} unreadable, {} evicted)",
            stats.restored,
            stats.discarded,
            stats.unreadable,
            stats.evicted
        );
        stats
    }

    /// Drop every snapshot and its persisted body.
    pub async fn clear(&mut self) {
        let removed = self.store.clear();
        self.release(removed).await;
    }

    async fn release(&self, removed: Vec<Snapshot>) {
        let Some(blobs) = &self.blobs else {
            return;
        };
        for snapshot in removed {
            let Some(key) = snapshot.storage_key() else {
                continue;
            };
            if let Err(err) = blobs.delete(key).await {
                log::warn!("Failed to delete snapshot {key}: {err}");
            }
        }
    }
}
