use serde::{Deserialize, Serialize};

/// Limits for the snapshot history
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Maximum number of files with history
    pub max_files: usize,

    /// Ceiling for the summed size of all snapshot bodies
    pub max_storage_size_kb: usize,

    /// Minimum gap between two snapshots of one file
    pub debounce_interval_ms: u64,

    /// Snapshots older than this are expired on the next sweep
    pub max_age_ms: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_files: 25,
            max_storage_size_kb: 5000,
            debounce_interval_ms: 2000,
            max_age_ms: 30_000,
        }
    }
}

impl SnapshotConfig {
    pub const fn max_storage_bytes(&self) -> usize {
        self.max_storage_size_kb.saturating_mul(1024)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_files == 0 {
            return Err("max_files must be > 0".to_string());
        }
        if self.max_age_ms == 0 {
            return Err("max_age_ms must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SnapshotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_storage_bytes(), 5000 * 1024);
    }

    #[test]
    fn test_validation() {
        let config = SnapshotConfig {
            max_files: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
