use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Everything the generation backend needs to describe one file
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Project-relative source path
    pub source_path: String,

    /// Language tag (`python`, `typescript`, `unknown`, …)
    pub language: String,

    /// Full source text
    pub source_text: String,

    /// Canonical interface encoding, when the language has an analyzer
    pub canonical_interface: Option<String>,

    /// Body of the existing design document, as regeneration context
    pub existing_doc: Option<String>,
}

/// Opaque output of the generation backend
///
/// The pipeline only assembles these fields into a document body; it never
/// interprets them.
#[derive(Debug, Clone, Default)]
pub struct GeneratedDoc {
    pub summary: String,
    pub interface_contract: String,
    pub dependencies_hint: Vec<String>,
    pub tests_ref: Option<String>,
    pub warnings: Vec<String>,
    pub tags: Vec<String>,
    pub cross_references: Vec<String>,
}

/// Generation backend failure; surfaced per file, never retried in-run
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("generation backend error: {0}")]
    Backend(String),

    #[error("generation backend unavailable: {0}")]
    Unavailable(String),
}

/// The external text-generation collaborator
///
/// The only suspension point in the per-file pipeline is this call.
#[async_trait]
pub trait DocGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<GeneratedDoc, GenerationError>;
}

/// Resolves a file's forward imports to project-relative paths
///
/// Third-party and unresolvable imports are silently omitted. The pipeline
/// sorts and deduplicates whatever comes back.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, file_path: &Path, project_root: &Path) -> Vec<String>;
}

/// Resolver for projects with no forward-dependency tracking
pub struct NoDependencies;

impl DependencyResolver for NoDependencies {
    fn resolve(&self, _file_path: &Path, _project_root: &Path) -> Vec<String> {
        Vec::new()
    }
}

/// Regenerates the project-level orientation document after a sweep
///
/// Consumed as a black box; failure is recorded as a flag on the sweep,
/// never propagated.
#[async_trait]
pub trait OrientationWriter: Send + Sync {
    async fn regenerate(&self, project_root: &Path, output_root: &Path) -> anyhow::Result<()>;
}
