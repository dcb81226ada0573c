use serde::{Deserialize, Serialize};

/// A fixed-size slice of a file's lines linked to the slice that follows it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Source file path
    pub source_file: String,

    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// The chunk's own text, matched against the query
    pub text: String,

    /// Text of the next chunk in the same file (own text for the last chunk)
    pub continuation_text: String,

    /// Relevance score assigned by a ranker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Chunk {
    /// Create a new chunk whose continuation is itself
    #[must_use]
    pub fn new(source_file: String, start_line: usize, end_line: usize, text: String) -> Self {
        Self {
            source_file,
            start_line,
            end_line,
            continuation_text: text.clone(),
            text,
            score: None,
        }
    }

    /// Get the number of lines in this chunk
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Builder: attach a score
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_line_count() {
        let chunk = Chunk::new("a.ts".to_string(), 10, 15, "code".to_string());
        assert_eq!(chunk.line_count(), 6);
    }

    #[test]
    fn test_new_chunk_continues_into_itself() {
        let chunk = Chunk::new("a.ts".to_string(), 1, 1, "only".to_string());
        assert_eq!(chunk.continuation_text, "only");
        assert!(chunk.score.is_none());
        assert_eq!(chunk.with_score(1.5).score, Some(1.5));
    }
}
