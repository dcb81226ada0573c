//! # Next-Edit Snapshot Store
//!
//! Rolling history of prior file contents used to show a predictor what
//! changed recently.
//!
//! ## Lifecycle
//!
//! ```text
//! edit event
//!     │
//!     ├──> debounce (one snapshot per file per interval)
//!     │
//!     ├──> body → BlobStore (optional, failures drop the snapshot)
//!     │
//!     └──> enforcement
//!          ├─> expire snapshots older than max_age
//!          ├─> drop whole files beyond max_files
//!          └─> evict globally oldest until under max_storage
//! ```
//!
//! Expiry is pull-based: the tracker sweeps before every read instead of
//! arming one timer per snapshot.
//!
//! ## Example
//!
//! ```rust
//! use nextedit_snapshot_store::{SnapshotConfig, SnapshotStore};
//!
//! let mut store = SnapshotStore::new(SnapshotConfig::default());
//! assert!(store.record("src/a.ts", "foo".to_string(), 0));
//! // Within the debounce interval: ignored
//! assert!(!store.record("src/a.ts", "foob".to_string(), 500));
//! assert_eq!(store.get("src/a.ts").len(), 1);
//! assert_eq!(store.total_size(), 3);
//! ```

mod blob;
mod config;
mod error;
mod snapshot;
mod store;
mod tracker;

pub use blob::{BlobStore, FsBlobStore, MemoryBlobStore};
pub use config::SnapshotConfig;
pub use error::{Result, SnapshotError};
pub use snapshot::{parse_storage_key, storage_key, LoadedSnapshot, Snapshot, SnapshotBody};
pub use store::SnapshotStore;
pub use tracker::{RestoreStats, SnapshotTracker};

/// Milliseconds since the Unix epoch, the clock every timestamp here uses.
pub fn unix_ms_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
