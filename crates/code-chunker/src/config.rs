use serde::{Deserialize, Serialize};

/// Configuration for line chunking behavior
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Number of lines per chunk
    pub chunk_lines: usize,

    /// Lines of the first chunk that form the extra head chunk
    pub head_lines: usize,

    /// Emit a head chunk pointing at the first chunk
    pub include_head_chunk: bool,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_lines: 50,
            head_lines: 3,
            include_head_chunk: true,
        }
    }
}

impl ChunkerConfig {
    /// Config with a specific chunk size and defaults otherwise
    pub fn with_chunk_lines(chunk_lines: usize) -> Self {
        Self {
            chunk_lines,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_lines == 0 {
            return Err("chunk_lines must be > 0".to_string());
        }

        if self.include_head_chunk && self.head_lines == 0 {
            return Err("head_lines must be > 0 when include_head_chunk is set".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ChunkerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ChunkerConfig::with_chunk_lines(0);
        assert!(config.validate().is_err());

        config.chunk_lines = 10;
        config.head_lines = 0;
        assert!(config.validate().is_err());

        // Head lines are irrelevant once the head chunk is off
        config.include_head_chunk = false;
        assert!(config.validate().is_ok());
    }
}
