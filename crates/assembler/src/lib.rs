//! # Next-Edit Context Assembler
//!
//! Turns an editor's state into the supplemental context that accompanies a
//! next-edit prediction request.
//!
//! ## Strategies
//!
//! ```text
//! active file ──┬── test file (java/py/js/ts) ──> FocalFile: leading slice of
//!               │                                  the source file under test
//!               ├── otherwise ──> Neighbors:
//!               │                   edit history: diff(snapshot, live), newest first
//!               │                   cross file:   BM25(query chunk, open files)
//!               └── nothing enabled ──> Disabled
//! ```
//!
//! Items are merged (history first, then cross-file by score) and cut to the
//! configured budget: per-item size, item count, then cumulative size.
//!
//! ## Example
//!
//! ```rust
//! use nextedit_assembler::{ContextConfig, ContextRequest, InMemoryWorkspace, PredictionTracker};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let tracker = PredictionTracker::new(ContextConfig::default()).unwrap();
//! tracker.on_edit("src/A.ts", "foo", 3_000).await;
//!
//! let request = ContextRequest::at_end("src/A.ts", "foobarbaz", 5_000);
//! let context = tracker.context_for(&request, &InMemoryWorkspace::new()).await;
//! assert_eq!(context.items[0].metadata.time_offset_ms, Some(2_000));
//! # }
//! ```

mod assembler;
mod config;
mod cross_file;
mod deadline;
mod error;
mod focal;
mod strategy;
mod tracker;
mod truncate;
mod workspace;

pub use assembler::{ContextAssembler, ContextRequest};
pub use config::ContextConfig;
pub use cross_file::{ChunkCache, CrossFileRetriever, CursorQuery};
pub use deadline::{Deadline, DeadlineExceeded};
pub use error::{AssemblerError, Result};
pub use focal::{resolve_focal_file, FocalMatch, FocalMethod};
pub use strategy::Strategy;
pub use tracker::PredictionTracker;
pub use truncate::{truncate_items, Budget};
pub use workspace::{FsWorkspace, InMemoryWorkspace, OpenDocument, Workspace};

pub use nextedit_protocol::{ContextItem, ContextKind, ContextOutcome, SupplementalContext};
