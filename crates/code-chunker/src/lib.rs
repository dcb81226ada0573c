//! # Next-Edit Code Chunker
//!
//! Line-oriented chunking for cross-file supplemental context.
//!
//! ## Philosophy
//!
//! A lexical ranker matches the text right before the cursor against chunks of
//! other files. The best match usually repeats code that already exists in the
//! editor, so every chunk carries the text of the chunk that follows it and the
//! caller hands out that continuation instead.
//!
//! ## Architecture
//!
//! ```text
//! Source file
//!     │
//!     ├──> Language Detection (from extension)
//!     │
//!     ├──> Fixed-size line chunks
//!     │
//!     └──> Linking
//!          ├─> head chunk (first lines → first chunk)
//!          └─> chunk i → chunk i+1 (last → itself)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use nextedit_code_chunker::{ChunkerConfig, LineChunker};
//!
//! let chunker = LineChunker::new(ChunkerConfig { chunk_lines: 2, ..Default::default() }).unwrap();
//! let chunks = chunker.chunk_str("a\nb\nc\nd\ne", "demo.ts");
//! assert_eq!(chunks[1].text, "a\nb");
//! assert_eq!(chunks[1].continuation_text, "c\nd");
//! ```

mod chunker;
mod config;
mod error;
mod language;
mod symbols;
mod types;

pub use chunker::{query_chunk, LineChunker};
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use language::{is_test_file, Language};
pub use symbols::{count_name_overlap, extract_referenced_names, extract_symbol_names};
pub use types::Chunk;
