//! # Next-Edit Search
//!
//! Lexical relevance ranking for cross-file context: a query chunk taken
//! around the cursor is scored against chunks of other project files with
//! BM25 and the best `k` are returned.

mod bm25;
mod tokenize;

pub use bm25::{bm25_idf, Bm25Params, RelevanceRanker};
pub use tokenize::tokenize;
