use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::types::Chunk;
use std::path::Path;

/// Splits files into fixed-size line chunks linked to their successors
#[derive(Debug, Clone)]
pub struct LineChunker {
    config: ChunkerConfig,
}

impl Default for LineChunker {
    fn default() -> Self {
        Self {
            config: ChunkerConfig::default(),
        }
    }
}

impl LineChunker {
    /// Create a new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Get current configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a file's text. Empty text yields no chunks.
    pub fn chunk_str(&self, content: &str, file_path: &str) -> Vec<Chunk> {
        let chunks = self.split(content, file_path);
        self.link(chunks)
    }

    /// Chunk code from a file on disk
    pub fn chunk_file(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let file_path = path.to_string_lossy();
        Ok(self.chunk_str(&content, &file_path))
    }

    fn split(&self, content: &str, file_path: &str) -> Vec<Chunk> {
        let lines: Vec<&str> = content.lines().collect();
        let mut chunks = Vec::with_capacity(lines.len() / self.config.chunk_lines + 1);
        let mut start = 0;

        while start < lines.len() {
            let end = (start + self.config.chunk_lines).min(lines.len());
            chunks.push(Chunk::new(
                file_path.to_string(),
                start + 1,
                end,
                lines[start..end].join("\n"),
            ));
            start = end;
        }

        chunks
    }

    /// Point every chunk at the next one and prepend the head chunk.
    fn link(&self, mut chunks: Vec<Chunk>) -> Vec<Chunk> {
        let Some(first) = chunks.first() else {
            return chunks;
        };

        let head = self.config.include_head_chunk.then(|| {
            let head_text = first
                .text
                .lines()
                .take(self.config.head_lines)
                .collect::<Vec<_>>()
                .join("\n")
                .trim_end()
                .to_string();
            let head_end = first.start_line + self.config.head_lines.min(first.line_count()) - 1;
            Chunk {
                source_file: first.source_file.clone(),
                start_line: first.start_line,
                end_line: head_end,
                text: head_text,
                continuation_text: first.text.clone(),
                score: None,
            }
        });

        for idx in 0..chunks.len().saturating_sub(1) {
            chunks[idx].continuation_text = chunks[idx + 1].text.clone();
        }

        let mut linked = Vec::with_capacity(chunks.len() + 1);
        linked.extend(head);
        linked.extend(chunks);
        linked
    }
}

/// The query chunk for a cursor: up to `max_lines` lines ending at the cursor,
/// with the cursor line cut at `column` (both 0-indexed, column in chars).
///
/// A trailing newline opens an empty last line, so a cursor placed after it
/// still sees the whole line above. Cursors past the end clamp to that line.
pub fn query_chunk(content: &str, line: usize, column: usize, max_lines: usize) -> String {
    if max_lines == 0 {
        return String::new();
    }
    let lines: Vec<&str> = content
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    let line = line.min(lines.len().saturating_sub(1));
    let start = (line + 1).saturating_sub(max_lines);
    let mut parts: Vec<String> = lines[start..line]
        .iter()
        .map(|l| (*l).to_string())
        .collect();
    let cursor_line = lines.get(line).copied().unwrap_or_default();
    parts.push(cursor_line.chars().take(column).collect());
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_chunk_empty_content() {
        let chunker = LineChunker::default();
        assert!(chunker.chunk_str("", "a.ts").is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(LineChunker::new(ChunkerConfig::with_chunk_lines(0)).is_err());
    }

    #[test]
    fn chunks_are_linked_to_their_successor() {
        let chunker = LineChunker::new(ChunkerConfig {
            chunk_lines: 2,
            include_head_chunk: false,
            ..Default::default()
        })
        .unwrap();
        let chunks = chunker.chunk_str(&numbered(5), "a.ts");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "line 1\nline 2");
        assert_eq!(chunks[0].continuation_text, "line 3\nline 4");
        assert_eq!(chunks[1].continuation_text, "line 5");
        // Last chunk points at itself
        assert_eq!(chunks[2].text, "line 5");
        assert_eq!(chunks[2].continuation_text, "line 5");
        assert_eq!((chunks[2].start_line, chunks[2].end_line), (5, 5));
    }

    #[test]
    fn head_chunk_points_at_first_chunk() {
        let chunker = LineChunker::new(ChunkerConfig::with_chunk_lines(4)).unwrap();
        let chunks = chunker.chunk_str(&numbered(6), "a.ts");

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "line 1\nline 2\nline 3");
        assert_eq!(chunks[0].continuation_text, chunks[1].text);
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 3));
        assert_eq!(chunks[1].continuation_text, "line 5\nline 6");
    }

    #[test]
    fn head_chunk_of_short_file_is_clamped() {
        let chunker = LineChunker::default();
        let chunks = chunker.chunk_str("only", "a.py");
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].start_line, chunks[0].end_line), (1, 1));
        assert_eq!(chunks[0].continuation_text, "only");
        assert_eq!(chunks[1].continuation_text, "only");
    }

    #[test]
    fn chunk_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.ts");
        std::fs::write(&path, numbered(3)).unwrap();

        let chunks = LineChunker::default().chunk_file(&path).unwrap();
        assert_eq!(chunks.last().unwrap().text, numbered(3));
        assert!(chunks[0].source_file.ends_with("lib.ts"));
    }

    #[test]
    fn query_chunk_ends_at_cursor() {
        let content = "alpha\nbeta\ngamma delta\nepsilon";
        assert_eq!(query_chunk(content, 2, 5, 2), "beta\ngamma");
        assert_eq!(query_chunk(content, 2, 100, 10), "alpha\nbeta\ngamma delta");
        assert_eq!(query_chunk(content, 0, 0, 10), "");
        assert_eq!(query_chunk(content, 99, 3, 1), "eps");
        assert_eq!(query_chunk("", 0, 0, 5), "");
    }

    #[test]
    fn query_chunk_after_trailing_newline_keeps_previous_line() {
        assert_eq!(query_chunk("a\nb\n", 2, 0, 50), "a\nb\n");
        // Only the line above and the empty cursor line fit
        assert_eq!(query_chunk("a\nb\n", 2, 0, 2), "b\n");
        assert_eq!(query_chunk("a\r\nb\r\n", 2, 0, 50), "a\nb\n");
        assert_eq!(query_chunk("a\nb\n", 7, 4, 3), "a\nb\n");
    }
}
