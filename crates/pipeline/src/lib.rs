//! # Scribe Pipeline
//!
//! Orchestration for keeping design documents in sync with their sources.
//!
//! Per file: classify against the stored footer, then skip, refresh the
//! footer, or call the generation collaborator and atomically write the
//! result — with a post-generation race recheck that discards generated
//! output whenever a concurrent hand-edit landed during the call. Across a
//! tree: discover eligible files in a stable order, tolerate per-file
//! failures, and hand off to the orientation writer at the end.
//!
//! Correctness under concurrent human edits comes entirely from the
//! hash-based detection in `scribe-staleness`; there is no locking.

mod config;
mod discover;
mod docstore;
mod error;
mod generate;
mod index;
mod sync;

pub use config::{
    SyncConfig, DEFAULT_DOC_BUDGET_BYTES, DEFAULT_MAX_SOURCE_BYTES, DEFAULT_OUTPUT_DIR,
};
pub use discover::FileScanner;
pub use docstore::{DocStore, StoredDoc};
pub use error::{PipelineError, Result};
pub use generate::{
    DependencyResolver, DocGenerator, GeneratedDoc, GenerationError, GenerationRequest,
    NoDependencies, OrientationWriter,
};
pub use index::{read_entries, upsert_entry, EntryKind, IndexEntry, INDEX_FILE_NAME};
pub use sync::{classify_paths, classify_tree, FileOutcome, SweepStats, SyncPipeline};
