use nextedit_snapshot_store::{
    storage_key, BlobStore, FsBlobStore, RestoreStats, SnapshotConfig, SnapshotTracker,
};
use std::sync::Arc;
use tempfile::TempDir;

fn config() -> SnapshotConfig {
    SnapshotConfig {
        debounce_interval_ms: 2000,
        max_age_ms: 60_000,
        ..Default::default()
    }
}

#[tokio::test]
async fn restart_restores_history_from_disk() {
    let temp = TempDir::new().expect("tempdir");
    let dir = temp.path().join("snapshots");

    {
        let blobs = Arc::new(FsBlobStore::new(&dir));
        let mut tracker = SnapshotTracker::with_blob_store(config(), blobs);
        assert!(tracker.record("src/A.ts", "foo", 1_000).await);
        assert!(tracker.record("src/A.ts", "foobar", 4_000).await);
        assert!(tracker.record("src/B.ts", "bar", 5_000).await);
    }

    let blobs = Arc::new(FsBlobStore::new(&dir));
    let mut tracker = SnapshotTracker::with_blob_store(config(), blobs);
    let stats = tracker.restore(6_000).await;
    assert_eq!(
        stats,
        RestoreStats {
            restored: 3,
            ..Default::default()
        }
    );
    assert_eq!(tracker.store().total_size(), 12);

    let history = tracker.snapshots("src/A.ts", 6_000).await;
    let contents: Vec<(u64, &str)> = history
        .iter()
        .map(|s| (s.timestamp_ms, s.content.as_str()))
        .collect();
    assert_eq!(contents, vec![(1_000, "foo"), (4_000, "foobar")]);

    // Debounce continues from the restored history
    assert!(!tracker.record("src/A.ts", "x", 5_000).await);
}

#[tokio::test]
async fn malformed_keys_are_discarded_and_deleted() {
    let temp = TempDir::new().expect("tempdir");
    let blobs = Arc::new(FsBlobStore::new(temp.path()));
    blobs.put("6162-notatime", "junk").await.expect("put");
    blobs
        .put(&storage_key("a.py", 100), "print()")
        .await
        .expect("put");

    let mut tracker = SnapshotTracker::with_blob_store(config(), blobs.clone());
    let stats = tracker.restore(200).await;

    assert_eq!(stats.restored, 1);
    assert_eq!(stats.discarded, 1);
    assert!(!temp.path().join("6162-notatime.snap").exists());
    assert_eq!(blobs.keys().await.expect("keys"), vec![storage_key("a.py", 100)]);
}

#[tokio::test]
async fn restore_applies_expiry_and_releases_bodies() {
    let temp = TempDir::new().expect("tempdir");
    let blobs = Arc::new(FsBlobStore::new(temp.path()));
    blobs.put(&storage_key("old.ts", 0), "old").await.expect("put");
    blobs
        .put(&storage_key("new.ts", 90_000), "new")
        .await
        .expect("put");

    let mut tracker = SnapshotTracker::with_blob_store(config(), blobs.clone());
    let stats = tracker.restore(100_000).await;

    assert_eq!(stats.restored, 1);
    assert_eq!(stats.evicted, 1);
    assert_eq!(tracker.store().tracked_files(), vec!["new.ts".to_string()]);
    assert_eq!(blobs.keys().await.expect("keys").len(), 1);
}
