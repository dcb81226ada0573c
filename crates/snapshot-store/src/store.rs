use crate::config::SnapshotConfig;
use crate::snapshot::Snapshot;
use std::collections::HashMap;

#[derive(Debug)]
struct FileHistory {
    /// First-insertion order, breaks timestamp ties during eviction
    order: u64,
    /// Non-decreasing by timestamp
    snapshots: Vec<Snapshot>,
}

/// In-memory index of snapshots per file.
///
/// The store never touches persistent storage. Every removal hands the removed
/// snapshots back so the owner can release their bodies.
#[derive(Debug)]
pub struct SnapshotStore {
    config: SnapshotConfig,
    files: HashMap<String, FileHistory>,
    total_size: usize,
    next_order: u64,
}

impl SnapshotStore {
    pub fn new(config: SnapshotConfig) -> Self {
        Self {
            config,
            files: HashMap::new(),
            total_size: 0,
            next_order: 0,
        }
    }

    pub const fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Whether a snapshot of `file_path` taken at `now` passes the debounce.
    pub fn should_record(&self, file_path: &str, now: u64) -> bool {
        match self.last_timestamp(file_path) {
            None => true,
            Some(last) => now.saturating_sub(last) > self.config.debounce_interval_ms,
        }
    }

    /// Append `prior_content` as a snapshot of `file_path` unless one was taken
    /// within the debounce interval. Returns whether it was stored.
    pub fn record(&mut self, file_path: &str, prior_content: String, now: u64) -> bool {
        if !self.should_record(file_path, now) {
            log::debug!("Skipping snapshot of {file_path}: debounced");
            return false;
        }
        self.insert(Snapshot::inline(file_path, prior_content, now));
        true
    }

    /// Insert a snapshot at its timestamp position without debouncing.
    pub(crate) fn insert(&mut self, snapshot: Snapshot) {
        self.total_size = self.total_size.saturating_add(snapshot.size);
        let next_order = &mut self.next_order;
        let history = self
            .files
            .entry(snapshot.file_path.clone())
            .or_insert_with(|| {
                let order = *next_order;
                *next_order += 1;
                FileHistory {
                    order,
                    snapshots: Vec::new(),
                }
            });
        let pos = history
            .snapshots
            .partition_point(|s| s.timestamp_ms <= snapshot.timestamp_ms);
        history.snapshots.insert(pos, snapshot);
    }

    /// Snapshots of `file_path`, oldest first.
    pub fn get(&self, file_path: &str) -> &[Snapshot] {
        self.files
            .get(file_path)
            .map(|h| h.snapshots.as_slice())
            .unwrap_or(&[])
    }

    pub fn last_timestamp(&self, file_path: &str) -> Option<u64> {
        self.get(file_path).last().map(|s| s.timestamp_ms)
    }

    /// Remove the globally oldest snapshot until the summed size is at most
    /// `max_storage_bytes`. Ties on timestamp go to the file tracked first.
    pub fn evict_oldest_until_under_limit(&mut self, max_storage_bytes: usize) -> Vec<Snapshot> {
        let mut removed = Vec::new();
        while self.total_size > max_storage_bytes {
            let Some(path) = self.oldest_file_by(|h| h.snapshots.first()) else {
                break;
            };
            if let Some(snapshot) = self.remove_first(&path) {
                removed.push(snapshot);
            }
        }
        if !removed.is_empty() {
            log::debug!(
                "Evicted {} snapshots to fit {} bytes (now {})",
                removed.len(),
                max_storage_bytes,
                self.total_size
            );
        }
        removed
    }

    /// Remove every snapshot whose age at `now` exceeds `max_age_ms`.
    pub fn expire_older_than(&mut self, now: u64, max_age_ms: u64) -> Vec<Snapshot> {
        let mut removed = Vec::new();
        for history in self.files.values_mut() {
            let keep_from = history
                .snapshots
                .partition_point(|s| now.saturating_sub(s.timestamp_ms) > max_age_ms);
            removed.extend(history.snapshots.drain(..keep_from));
        }
        self.files.retain(|_, h| !h.snapshots.is_empty());
        for snapshot in &removed {
            self.total_size = self.total_size.saturating_sub(snapshot.size);
        }
        removed.sort_by(|a, b| {
            a.timestamp_ms
                .cmp(&b.timestamp_ms)
                .then_with(|| a.file_path.cmp(&b.file_path))
        });
        removed
    }

    /// Drop whole histories, least recently edited first, until at most
    /// `max_files` files are tracked.
    pub fn enforce_max_files(&mut self, max_files: usize) -> Vec<Snapshot> {
        let mut removed = Vec::new();
        while self.files.len() > max_files {
            let Some(path) = self.oldest_file_by(|h| h.snapshots.last()) else {
                break;
            };
            if let Some(history) = self.files.remove(&path) {
                for snapshot in &history.snapshots {
                    self.total_size = self.total_size.saturating_sub(snapshot.size);
                }
                log::debug!("Dropping history of {path}: more than {max_files} files tracked");
                removed.extend(history.snapshots);
            }
        }
        removed
    }

    /// Apply every configured limit as of `now`.
    pub fn enforce(&mut self, now: u64) -> Vec<Snapshot> {
        let mut removed = self.expire_older_than(now, self.config.max_age_ms);
        removed.extend(self.enforce_max_files(self.config.max_files));
        removed.extend(self.evict_oldest_until_under_limit(self.config.max_storage_bytes()));
        removed
    }

    /// Remove everything, returning what was held.
    pub fn clear(&mut self) -> Vec<Snapshot> {
        self.total_size = 0;
        self.files
            .drain()
            .flat_map(|(_, history)| history.snapshots)
            .collect()
    }

    /// Sum of all retained snapshot sizes in bytes
    pub const fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn snapshot_count(&self) -> usize {
        self.files.values().map(|h| h.snapshots.len()).sum()
    }

    /// Tracked paths in first-insertion order
    pub fn tracked_files(&self) -> Vec<String> {
        let mut files: Vec<(&String, u64)> =
            self.files.iter().map(|(path, h)| (path, h.order)).collect();
        files.sort_by_key(|(_, order)| *order);
        files.into_iter().map(|(path, _)| path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn oldest_file_by(&self, pick: impl Fn(&FileHistory) -> Option<&Snapshot>) -> Option<String> {
        self.files
            .iter()
            .filter_map(|(path, history)| {
                pick(history).map(|s| ((s.timestamp_ms, history.order), path))
            })
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, path)| path.clone())
    }

    fn remove_first(&mut self, path: &str) -> Option<Snapshot> {
        let history = self.files.get_mut(path)?;
        if history.snapshots.is_empty() {
            self.files.remove(path);
            return None;
        }
        let snapshot = history.snapshots.remove(0);
        if history.snapshots.is_empty() {
            self.files.remove(path);
        }
        self.total_size = self.total_size.saturating_sub(snapshot.size);
        Some(snapshot)
    }
}
