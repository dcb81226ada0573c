use crate::error::{Result, SnapshotError};

/// Where a snapshot's text lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotBody {
    Inline(String),
    /// Body written to a `BlobStore` under `key`
    Stored { key: String },
}

/// A stored copy of a file's content at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub file_path: String,
    pub timestamp_ms: u64,
    /// Body length in bytes
    pub size: usize,
    pub body: SnapshotBody,
}

impl Snapshot {
    pub fn inline(file_path: impl Into<String>, content: String, timestamp_ms: u64) -> Self {
        Self {
            file_path: file_path.into(),
            timestamp_ms,
            size: content.len(),
            body: SnapshotBody::Inline(content),
        }
    }

    pub fn stored(
        file_path: impl Into<String>,
        key: String,
        size: usize,
        timestamp_ms: u64,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            timestamp_ms,
            size,
            body: SnapshotBody::Stored { key },
        }
    }

    /// Inline text, if the body is held in memory
    pub fn inline_content(&self) -> Option<&str> {
        match &self.body {
            SnapshotBody::Inline(text) => Some(text),
            SnapshotBody::Stored { .. } => None,
        }
    }

    pub fn storage_key(&self) -> Option<&str> {
        match &self.body {
            SnapshotBody::Inline(_) => None,
            SnapshotBody::Stored { key } => Some(key),
        }
    }
}

/// A snapshot with its body loaded, handed to diff builders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSnapshot {
    pub file_path: String,
    pub timestamp_ms: u64,
    pub content: String,
}

/// Key under which a snapshot body is persisted: hex-encoded path, a dash,
/// then the decimal timestamp.
pub fn storage_key(file_path: &str, timestamp_ms: u64) -> String {
    format!("{}-{timestamp_ms}", hex::encode(file_path.as_bytes()))
}

/// Inverse of [`storage_key`].
pub fn parse_storage_key(key: &str) -> Result<(String, u64)> {
    let (encoded, timestamp) = key
        .rsplit_once('-')
        .ok_or_else(|| SnapshotError::InvalidKey(key.to_string()))?;
    let timestamp = timestamp
        .parse::<u64>()
        .map_err(|_| SnapshotError::InvalidKey(key.to_string()))?;
    let bytes = hex::decode(encoded).map_err(|_| SnapshotError::InvalidKey(key.to_string()))?;
    let path = String::from_utf8(bytes).map_err(|_| SnapshotError::InvalidKey(key.to_string()))?;
    if path.is_empty() {
        return Err(SnapshotError::InvalidKey(key.to_string()));
    }
    Ok((path, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_round_trips_paths_with_dashes() {
        let key = storage_key("src/my-file.ts", 1_700_000_000_123);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        let (path, ts) = parse_storage_key(&key).unwrap();
        assert_eq!(path, "src/my-file.ts");
        assert_eq!(ts, 1_700_000_000_123);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        for key in ["", "nodash", "6162-notanumber", "zz-12", "-12"] {
            assert!(parse_storage_key(key).is_err(), "accepted {key:?}");
        }
    }

    #[test]
    fn inline_snapshot_measures_bytes() {
        let snap = Snapshot::inline("a.ts", "héllo".to_string(), 7);
        assert_eq!(snap.size, 6);
        assert_eq!(snap.inline_content(), Some("héllo"));
        assert!(snap.storage_key().is_none());
    }
}
