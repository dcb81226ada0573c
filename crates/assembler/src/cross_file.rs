//! Cross-file context: BM25 over chunks of neighbouring open documents.

use crate::deadline::{Deadline, DeadlineExceeded};
use crate::workspace::Workspace;
use lru::LruCache;
use nextedit_code_chunker::{query_chunk, Chunk, Language, LineChunker};
use nextedit_protocol::{ContextItem, ContextKind};
use nextedit_search::{Bm25Params, RelevanceRanker};
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const CHUNK_CACHE_CAPACITY: usize = 64;

/// Chunked files keyed by path and content hash
pub struct ChunkCache {
    entries: Mutex<LruCache<String, Arc<Vec<Chunk>>>>,
}

impl Default for ChunkCache {
    fn default() -> Self {
        Self::new(CHUNK_CACHE_CAPACITY)
    }
}

impl ChunkCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Chunks of `content`, computed once per distinct (path, content).
    pub fn chunks(&self, chunker: &LineChunker, path: &str, content: &str) -> Arc<Vec<Chunk>> {
        let key = cache_key(path, content);
        if let Some(hit) = self.lock().get(&key) {
            return Arc::clone(hit);
        }
        let chunks = Arc::new(chunker.chunk_str(content, path));
        self.lock().put(key, Arc::clone(&chunks));
        chunks
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<Vec<Chunk>>>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn cache_key(path: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{path}\0{}", hex::encode(hasher.finalize()))
}

/// Where the cursor is in the active buffer
#[derive(Debug, Clone, Copy)]
pub struct CursorQuery<'a> {
    pub file_path: &'a str,
    pub content: &'a str,
    /// 0-indexed
    pub line: usize,
    /// 0-indexed, in characters
    pub column: usize,
}

pub struct CrossFileRetriever {
    chunker: LineChunker,
    params: Bm25Params,
    top_k: usize,
    max_candidate_files: usize,
    cache: ChunkCache,
}

impl CrossFileRetriever {
    pub fn new(
        chunker: LineChunker,
        params: Bm25Params,
        top_k: usize,
        max_candidate_files: usize,
    ) -> Self {
        Self {
            chunker,
            params,
            top_k,
            max_candidate_files,
            cache: ChunkCache::default(),
        }
    }

    pub fn cache(&self) -> &ChunkCache {
        &self.cache
    }

    /// Continuation text of the best-matching chunks, best first.
    ///
    /// Chunks without any lexical overlap with the query are not returned.
    pub async fn retrieve(
        &self,
        workspace: &dyn Workspace,
        cursor: CursorQuery<'_>,
        deadline: &Deadline,
    ) -> Result<Vec<ContextItem>, DeadlineExceeded> {
        let language = Language::from_path(cursor.file_path);
        if !language.supports_cross_file() {
            return Ok(Vec::new());
        }

        let query = query_chunk(
            cursor.content,
            cursor.line,
            cursor.column,
            self.chunker.config().chunk_lines,
        );
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let open = workspace.open_documents().await;
        let mut corpus = Vec::new();
        let mut files = 0;
        for doc in open.iter().filter(|doc| {
            doc.path != cursor.file_path && Language::from_path(&doc.path).same_family(language)
        }) {
            if files == self.max_candidate_files {
                break;
            }
            deadline.check()?;
            let chunks = self.cache.chunks(&self.chunker, &doc.path, &doc.content);
            corpus.extend(chunks.iter().cloned());
            files += 1;
        }
        if corpus.is_empty() {
            return Ok(Vec::new());
        }

        let ranker = RelevanceRanker::with_params(self.params, corpus);
        let items: Vec<ContextItem> = ranker
            .top_k(&query, self.top_k)
            .into_iter()
            .filter_map(|chunk| {
                let score = chunk.score.filter(|score| *score > 0.0)?;
                Some(
                    ContextItem::new(
                        chunk.source_file,
                        chunk.continuation_text,
                        ContextKind::CrossFileChunk,
                    )
                    .with_score(score),
                )
            })
            .collect();
        log::debug!(
            "Cross-file context for {}: {} items from {files} files ({} chunks)",
            cursor.file_path,
            items.len(),
            ranker.len()
        );
        Ok(items)
    }
}
