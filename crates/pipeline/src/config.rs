use std::path::{Path, PathBuf};

/// Default name of the tool's output tree inside the project root
pub const DEFAULT_OUTPUT_DIR: &str = ".scribe";

/// Default size budget for one design document
pub const DEFAULT_DOC_BUDGET_BYTES: usize = 16 * 1024;

/// Sources above this size are skipped during discovery
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 1_048_576; // 1 MB

/// Configuration threaded through discovery and the sync pipeline
///
/// Passed explicitly everywhere; there is no ambient global state.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root of the source tree being documented
    pub project_root: PathBuf,

    /// Name of the output tree directory under the project root
    pub output_dir_name: String,

    /// Soft size budget per document; overage is flagged, never blocking
    pub doc_budget_bytes: usize,

    /// Hard size cap on sources considered during discovery
    pub max_source_bytes: u64,

    /// Identifier written into every footer's `generator` field
    pub generator_id: String,
}

impl SyncConfig {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            output_dir_name: DEFAULT_OUTPUT_DIR.to_string(),
            doc_budget_bytes: DEFAULT_DOC_BUDGET_BYTES,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
            generator_id: format!("scribe {}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Absolute path of the output tree
    pub fn output_root(&self) -> PathBuf {
        self.project_root.join(&self.output_dir_name)
    }
}
