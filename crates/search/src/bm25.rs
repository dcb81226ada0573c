use crate::tokenize::tokenize;
use nextedit_code_chunker::Chunk;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// BM25 free parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Params {
    /// Term-frequency saturation
    pub k1: f64,
    /// Document-length normalization
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

struct IndexedDoc {
    term_freq: HashMap<String, usize>,
    len: usize,
}

/// Ranks a fixed corpus of chunks against query text with Okapi BM25.
///
/// The corpus is tokenized once by [`RelevanceRanker::index`]; every query
/// afterwards only tokenizes the query text.
pub struct RelevanceRanker {
    params: Bm25Params,
    chunks: Vec<Chunk>,
    docs: Vec<IndexedDoc>,
    doc_freq: HashMap<String, usize>,
    avg_len: f64,
}

impl RelevanceRanker {
    /// Index `chunks` with the default parameters.
    pub fn index(chunks: Vec<Chunk>) -> Self {
        Self::with_params(Bm25Params::default(), chunks)
    }

    pub fn with_params(params: Bm25Params, chunks: Vec<Chunk>) -> Self {
        let mut docs = Vec::with_capacity(chunks.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for chunk in &chunks {
            let tokens = tokenize(&chunk.text);
            total_len += tokens.len();
            let mut term_freq: HashMap<String, usize> = HashMap::new();
            for token in tokens.iter() {
                *term_freq.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
            docs.push(IndexedDoc {
                term_freq,
                len: tokens.len(),
            });
        }

        let avg_len = total_len as f64 / docs.len().max(1) as f64;
        log::trace!(
            "Indexed {} chunks ({} distinct terms, avg length {avg_len:.1})",
            docs.len(),
            doc_freq.len()
        );

        Self {
            params,
            chunks,
            docs,
            doc_freq,
            avg_len,
        }
    }

    pub const fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Score of every corpus chunk against `query`, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let terms = query_terms(query);
        (0..self.docs.len())
            .map(|idx| self.score_doc(idx, &terms))
            .collect()
    }

    /// The `k` best-scoring chunks, best first, each carrying its score.
    /// Equal scores keep corpus order. Returns fewer than `k` only when the
    /// corpus is smaller.
    pub fn top_k(&self, query: &str, k: usize) -> Vec<Chunk> {
        if k == 0 || self.chunks.is_empty() {
            return Vec::new();
        }
        let scores = self.scores(query);
        let mut order: Vec<usize> = (0..scores.len()).collect();
        // Stable sort: ties stay in corpus order
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(Ordering::Equal)
        });
        order
            .into_iter()
            .take(k)
            .map(|idx| self.chunks[idx].clone().with_score(scores[idx]))
            .collect()
    }

    fn score_doc(&self, idx: usize, terms: &[String]) -> f64 {
        let Some(doc) = self.docs.get(idx) else {
            return 0.0;
        };
        if doc.len == 0 {
            return 0.0;
        }

        let total_docs = self.docs.len() as f64;
        let dl = doc.len as f64;
        let Bm25Params { k1, b } = self.params;
        let mut score = 0.0;

        for term in terms {
            let freq = doc.term_freq.get(term).copied().unwrap_or(0) as f64;
            if freq <= 0.0 {
                continue;
            }
            let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
            let denom = freq + k1 * (1.0 - b + b * dl / self.avg_len.max(1e-3));
            if denom > 0.0 {
                score += bm25_idf(total_docs, df) * (freq * (k1 + 1.0)) / denom;
            }
        }
        score
    }
}

/// Distinct query terms in first-seen order
fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(query)
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

/// Smoothed IDF; stays positive even for terms present in every document.
pub fn bm25_idf(total_docs: f64, df: f64) -> f64 {
    ((total_docs - df + 0.5) / (df + 0.5) + 1.0).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Chunk::new(format!("f{i}.ts"), i * 10, i * 10 + 1, text.to_string()))
            .collect()
    }

    fn paths(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.source_file.as_str()).collect()
    }

    #[test]
    fn score_matches_hand_computed_value() {
        let ranker = RelevanceRanker::index(corpus(&["alpha beta", "alpha gamma gamma", "delta"]));
        let scores = ranker.scores("gamma");
        // idf = ln(2.5 / 1.5 + 1), tf part = 2 * 2.5 / (2 + 1.5 * (0.25 + 0.75 * 3 / 2))
        assert!((scores[1] - 1.207_174_465).abs() < 1e-6, "{}", scores[1]);
        assert_eq!(scores[0], 0.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn top_k_orders_by_relevance() {
        let ranker = RelevanceRanker::index(corpus(&[
            "function render(view) { return view }",
            "function parseConfig(path) { readFile(path) }",
            "const config = parseConfig(configPath); validate(config)",
        ]));
        let top = ranker.top_k("parseConfig config", 2);
        assert_eq!(paths(&top), vec!["f2.ts", "f1.ts"]);
        assert!(top[0].score.unwrap() >= top[1].score.unwrap());
    }

    #[test]
    fn ties_keep_corpus_order() {
        let ranker = RelevanceRanker::index(corpus(&["x y", "a b", "x y", "x y"]));
        let top = ranker.top_k("x", 3);
        assert_eq!(paths(&top), vec!["f0.ts", "f2.ts", "f3.ts"]);
    }

    #[test]
    fn returns_at_most_corpus_size() {
        let ranker = RelevanceRanker::index(corpus(&["one", "two"]));
        assert_eq!(ranker.top_k("one", 5).len(), 2);
        assert!(ranker.top_k("one", 0).is_empty());
        assert!(RelevanceRanker::index(Vec::new()).top_k("one", 3).is_empty());
    }

    #[test]
    fn query_without_matches_scores_zero_in_corpus_order() {
        let ranker = RelevanceRanker::index(corpus(&["alpha", "beta"]));
        let top = ranker.top_k("zeta", 2);
        assert_eq!(paths(&top), vec!["f0.ts", "f1.ts"]);
        assert!(top.iter().all(|c| c.score == Some(0.0)));
    }

    #[test]
    fn repeated_query_terms_count_once() {
        let ranker = RelevanceRanker::index(corpus(&["alpha beta", "gamma"]));
        assert_eq!(ranker.scores("alpha"), ranker.scores("alpha alpha ALPHA"));
    }

    #[test]
    fn ranking_is_deterministic() {
        let texts = ["a b c", "b c d", "c d e", "a a a"];
        let first = RelevanceRanker::index(corpus(&texts)).top_k("a c", 4);
        let second = RelevanceRanker::index(corpus(&texts)).top_k("a c", 4);
        assert_eq!(first, second);
    }

    #[test]
    fn idf_is_positive_for_ubiquitous_terms() {
        assert!(bm25_idf(3.0, 3.0) > 0.0);
        assert!(bm25_idf(10.0, 1.0) > bm25_idf(10.0, 5.0));
    }
}
