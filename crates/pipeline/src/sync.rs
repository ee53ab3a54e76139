use crate::config::SyncConfig;
use crate::discover::{is_binary_path, FileScanner};
use crate::docstore::{DocStore, StoredDoc};
use crate::error::{PipelineError, Result};
use crate::generate::{
    DependencyResolver, DocGenerator, GeneratedDoc, GenerationRequest, OrientationWriter,
};
use crate::index::{upsert_entry, EntryKind};
use scribe_staleness::{
    classify, content_digest, design_body_digest, interface_digest, ChangeLevel, Digest,
    DocFooter, DocSnapshot, SourceFingerprint,
};
use scribe_surface::{encode, extract_interface, InterfaceSkeleton, Language};
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Result of pushing one file through the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Project-relative source path
    pub path: String,

    /// Detected change level (after a race downgrade, the level of the
    /// action actually taken)
    pub change_level: ChangeLevel,

    /// Whether the parent directory's index entry was rewritten
    pub index_refreshed: bool,

    /// Whether the written document exceeded the size budget
    pub budget_exceeded: bool,

    /// Whether this file failed (conflict markers, backend error, I/O)
    pub failed: bool,
}

impl FileOutcome {
    fn clean(path: String, change_level: ChangeLevel) -> Self {
        Self {
            path,
            change_level,
            index_refreshed: false,
            budget_exceeded: false,
            failed: false,
        }
    }

    fn failure(path: String, change_level: ChangeLevel) -> Self {
        Self {
            failed: true,
            ..Self::clean(path, change_level)
        }
    }
}

/// Counters accumulated across a sweep or batch update
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepStats {
    /// Files pushed through the pipeline
    pub scanned: usize,

    /// Documents written via a generation call
    pub generated: usize,

    /// Footer-only refreshes (hand-edited documents)
    pub refreshed: usize,

    /// Files needing no I/O at all
    pub unchanged: usize,

    /// Per-file failures; never aborts the sweep
    pub failed: usize,

    /// Documents written over the size budget
    pub budget_exceeded: usize,

    /// The end-of-sweep orientation regeneration failed
    pub orientation_failed: bool,

    /// Per-file outcomes in processing order
    pub outcomes: Vec<FileOutcome>,
}

impl SweepStats {
    fn record(&mut self, outcome: FileOutcome) {
        self.scanned += 1;
        if outcome.failed {
            self.failed += 1;
        } else {
            match outcome.change_level {
                ChangeLevel::Unchanged => self.unchanged += 1,
                ChangeLevel::AgentUpdated => self.refreshed += 1,
                _ => self.generated += 1,
            }
        }
        if outcome.budget_exceeded {
            self.budget_exceeded += 1;
        }
        self.outcomes.push(outcome);
    }

    fn record_error(&mut self, path: &Path, error: &PipelineError) {
        log::warn!("{}: {error}", path.display());
        self.scanned += 1;
        self.failed += 1;
    }
}

/// Everything known about one source file before any pipeline action
struct FileProbe {
    rel: String,
    source: String,
    language: Language,
    skeleton: Option<InterfaceSkeleton>,
    fingerprint: SourceFingerprint,
    stored: Option<StoredDoc>,
    level: ChangeLevel,
}

/// Drives source files through classification, generation, and atomic
/// persistence
///
/// Files are processed strictly one at a time; the single suspension
/// point per file is the generation call, and the race recheck after it
/// is the only place that re-reads shared state.
pub struct SyncPipeline {
    config: SyncConfig,
    store: DocStore,
    generator: Box<dyn DocGenerator>,
    resolver: Box<dyn DependencyResolver>,
}

impl SyncPipeline {
    pub fn new(
        config: SyncConfig,
        generator: Box<dyn DocGenerator>,
        resolver: Box<dyn DependencyResolver>,
    ) -> Self {
        let store = DocStore::new(&config);
        Self {
            config,
            store,
            generator,
            resolver,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Push one file through the per-file state machine
    pub async fn sync_file(&self, path: &Path) -> Result<FileOutcome> {
        let probe = probe_file(&self.config, &self.store, path).await?;
        log::debug!("{}: {}", probe.rel, probe.level.as_str());

        match probe.level {
            ChangeLevel::Unchanged => Ok(FileOutcome::clean(probe.rel, ChangeLevel::Unchanged)),
            ChangeLevel::AgentUpdated => {
                // Classification guarantees a stored document here.
                let Some(doc) = probe.stored else {
                    return Ok(FileOutcome::failure(probe.rel, ChangeLevel::AgentUpdated));
                };
                let index_refreshed = self
                    .refresh_footer(&probe.rel, &doc.body, &probe.fingerprint)
                    .await?;
                Ok(FileOutcome {
                    index_refreshed,
                    ..FileOutcome::clean(probe.rel, ChangeLevel::AgentUpdated)
                })
            }
            _ => self.generate_document(probe).await,
        }
    }

    /// Full pass over every eligible file under the project root
    pub async fn sweep(&self, orientation: Option<&dyn OrientationWriter>) -> Result<SweepStats> {
        let files = FileScanner::new(&self.config).scan();
        log::info!(
            "Sweeping {} files under {}",
            files.len(),
            self.config.project_root.display()
        );

        let mut stats = SweepStats::default();
        for file in files {
            match self.sync_file(&file).await {
                Ok(outcome) => stats.record(outcome),
                Err(e) => stats.record_error(&file, &e),
            }
        }

        if let Some(orientation) = orientation {
            if let Err(e) = orientation
                .regenerate(&self.config.project_root, &self.config.output_root())
                .await
            {
                log::warn!("Orientation regeneration failed: {e}");
                stats.orientation_failed = true;
            }
        }

        Ok(stats)
    }

    /// Run an explicit file list through the pipeline
    ///
    /// Paths that vanished, are binary, or lie inside the output tree are
    /// dropped silently. No orientation regeneration.
    pub async fn update_paths(&self, paths: &[PathBuf]) -> Result<SweepStats> {
        let mut stats = SweepStats::default();
        for path in paths {
            let abs = if path.is_absolute() {
                path.clone()
            } else {
                self.config.project_root.join(path)
            };
            if !abs.is_file() || is_binary_path(&abs) || abs.starts_with(self.config.output_root())
            {
                log::debug!("Dropping ineligible path {}", abs.display());
                continue;
            }
            match self.sync_file(&abs).await {
                Ok(outcome) => stats.record(outcome),
                Err(e) => stats.record_error(&abs, &e),
            }
        }
        Ok(stats)
    }

    async fn generate_document(&self, probe: FileProbe) -> Result<FileOutcome> {
        let level = probe.level;

        // Never document a half-merged file.
        if has_conflict_markers(&probe.source) {
            log::warn!(
                "{}: unresolved merge conflict markers, generation skipped",
                probe.rel
            );
            return Ok(FileOutcome::failure(probe.rel, level));
        }

        let pre_call_digest = probe.stored.as_ref().map(|doc| doc.body_digest.clone());
        let request = GenerationRequest {
            source_path: probe.rel.clone(),
            language: probe.language.as_str().to_string(),
            source_text: probe.source.clone(),
            canonical_interface: probe
                .skeleton
                .as_ref()
                .map(|skeleton| String::from_utf8_lossy(&encode(skeleton)).into_owned()),
            existing_doc: probe.stored.as_ref().map(|doc| doc.body.clone()),
        };

        let generated = match self.generator.generate(&request).await {
            Ok(generated) => generated,
            Err(e) => {
                log::warn!("{}: {e}", probe.rel);
                return Ok(FileOutcome::failure(probe.rel, level));
            }
        };

        // Race recheck: one read, one compare. A body that moved during
        // the await is a concurrent hand-edit, and the edit wins.
        if let Some(snapshot) = pre_call_digest {
            if let Some(current) = self.store.read(&probe.rel).await? {
                if current.body_digest != snapshot {
                    log::info!(
                        "{}: document edited during generation; discarding generated output",
                        probe.rel
                    );
                    let index_refreshed = self
                        .refresh_footer(&probe.rel, &current.body, &probe.fingerprint)
                        .await?;
                    return Ok(FileOutcome {
                        index_refreshed,
                        ..FileOutcome::clean(probe.rel, ChangeLevel::AgentUpdated)
                    });
                }
            }
        }

        let mut dependencies = self
            .resolver
            .resolve(&self.config.project_root.join(&probe.rel), &self.config.project_root);
        dependencies.extend(generated.dependencies_hint.iter().cloned());
        dependencies.sort();
        dependencies.dedup();

        let body = build_document(&probe.rel, &generated, &dependencies);
        let budget_exceeded = body.len() > self.config.doc_budget_bytes;
        if budget_exceeded {
            log::warn!(
                "{}: document size {} exceeds budget {}",
                probe.rel,
                body.len(),
                self.config.doc_budget_bytes
            );
        }

        let footer = self.footer_for(&probe.rel, &probe.fingerprint, design_body_digest(&body));
        self.store.write(&probe.rel, &body, &footer).await?;

        let description = extract_description(&body);
        let index_refreshed = if description.is_empty() {
            false
        } else {
            self.refresh_index_entry(&probe.rel, &description).await?
        };

        Ok(FileOutcome {
            path: probe.rel,
            change_level: level,
            index_refreshed,
            budget_exceeded,
            failed: false,
        })
    }

    /// Rewrite only the footer; the body text is never touched
    async fn refresh_footer(
        &self,
        rel: &str,
        body: &str,
        fingerprint: &SourceFingerprint,
    ) -> Result<bool> {
        let footer = self.footer_for(rel, fingerprint, design_body_digest(body));
        self.store.write(rel, body, &footer).await?;

        let description = extract_description(body);
        if description.is_empty() {
            return Ok(false);
        }
        self.refresh_index_entry(rel, &description).await
    }

    async fn refresh_index_entry(&self, rel: &str, description: &str) -> Result<bool> {
        let doc_path = self.store.doc_path(rel);
        let Some(dir) = doc_path.parent() else {
            return Ok(false);
        };
        let name = rel.rsplit('/').next().unwrap_or(rel);
        upsert_entry(dir, name, EntryKind::File, description).await
    }

    fn footer_for(
        &self,
        rel: &str,
        fingerprint: &SourceFingerprint,
        design_hash: Digest,
    ) -> DocFooter {
        DocFooter {
            source: rel.to_string(),
            source_hash: fingerprint.content.clone(),
            interface_hash: fingerprint.interface.clone(),
            design_hash,
            generated: timestamp_now(),
            generator: self.config.generator_id.clone(),
        }
    }
}

/// Classify every eligible file under the root without writing anything
pub async fn classify_tree(config: &SyncConfig) -> Result<Vec<(String, ChangeLevel)>> {
    let store = DocStore::new(config);
    let mut results = Vec::new();
    for path in FileScanner::new(config).scan() {
        match probe_file(config, &store, &path).await {
            Ok(probe) => results.push((probe.rel, probe.level)),
            Err(e) => log::warn!("{}: {e}", path.display()),
        }
    }
    Ok(results)
}

/// Classify explicit files without writing anything
pub async fn classify_paths(
    config: &SyncConfig,
    paths: &[PathBuf],
) -> Result<Vec<(String, ChangeLevel)>> {
    let store = DocStore::new(config);
    let mut results = Vec::new();
    for path in paths {
        let abs = if path.is_absolute() {
            path.clone()
        } else {
            config.project_root.join(path)
        };
        if !abs.is_file() || is_binary_path(&abs) || abs.starts_with(config.output_root()) {
            continue;
        }
        match probe_file(config, &store, &abs).await {
            Ok(probe) => results.push((probe.rel, probe.level)),
            Err(e) => log::warn!("{}: {e}", abs.display()),
        }
    }
    Ok(results)
}

/// Read, fingerprint, and classify one file
async fn probe_file(config: &SyncConfig, store: &DocStore, path: &Path) -> Result<FileProbe> {
    let rel = relative_path(&config.project_root, path)?;
    let bytes = tokio::fs::read(path).await?;
    let source = String::from_utf8_lossy(&bytes).into_owned();

    let language = Language::from_path(path);
    let skeleton = extract_interface(&source, &rel, language);
    let fingerprint = SourceFingerprint {
        content: content_digest(&bytes),
        interface: skeleton.as_ref().map(interface_digest),
    };

    let stored = store.read(&rel).await?;
    let snapshot = stored.as_ref().map(|doc| DocSnapshot {
        footer: doc.footer.clone(),
        body_digest: doc.body_digest.clone(),
    });
    let level = classify(snapshot.as_ref(), &fingerprint);

    Ok(FileProbe {
        rel,
        source,
        language,
        skeleton,
        fingerprint,
        stored,
        level,
    })
}

/// Normalize a path to project-relative, forward-slash form
fn relative_path(project_root: &Path, path: &Path) -> Result<String> {
    let rel = path.strip_prefix(project_root).unwrap_or(path);
    let mut parts: Vec<String> = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(PipelineError::invalid_path(format!(
                    "{} is not inside the project root",
                    path.display()
                )))
            }
        }
    }
    if parts.is_empty() {
        return Err(PipelineError::invalid_path(path.display().to_string()));
    }
    Ok(parts.join("/"))
}

/// Detect unresolved merge-conflict markers
///
/// A bare `=======` line is a legal setext underline in plain text, so
/// only the unambiguous head/tail markers count.
fn has_conflict_markers(source: &str) -> bool {
    source
        .lines()
        .any(|line| line.starts_with("<<<<<<<") || line.starts_with(">>>>>>>"))
}

/// First block-quote line of a body, used as the index description
fn extract_description(body: &str) -> String {
    body.lines()
        .find(|line| line.trim_start().starts_with("> "))
        .map(|line| line.trim_start().trim_start_matches("> ").trim().to_string())
        .unwrap_or_default()
}

/// Assemble a document body from generated content and resolved deps
fn build_document(rel: &str, generated: &GeneratedDoc, dependencies: &[String]) -> String {
    let mut body = String::new();
    body.push_str(&format!("# {rel}\n\n"));

    let description = generated.summary.lines().next().unwrap_or("").trim();
    if !description.is_empty() {
        body.push_str(&format!("> {description}\n\n"));
    }

    if !generated.tags.is_empty() {
        body.push_str(&format!("Tags: {}\n\n", generated.tags.join(", ")));
    }

    body.push_str("## Summary\n\n");
    body.push_str(generated.summary.trim());
    body.push('\n');

    if !generated.interface_contract.trim().is_empty() {
        body.push_str("\n## Interface\n\n");
        body.push_str(generated.interface_contract.trim());
        body.push('\n');
    }

    if !dependencies.is_empty() {
        body.push_str("\n## Dependencies\n\n");
        for dependency in dependencies {
            body.push_str(&format!("- {dependency}\n"));
        }
    }

    if let Some(tests_ref) = &generated.tests_ref {
        body.push_str(&format!("\n## Tests\n\n- {tests_ref}\n"));
    }

    if !generated.warnings.is_empty() {
        body.push_str("\n## Warnings\n\n");
        for warning in &generated.warnings {
            body.push_str(&format!("- {warning}\n"));
        }
    }

    if !generated.cross_references.is_empty() {
        body.push_str("\n## See also\n\n");
        for reference in &generated.cross_references {
            body.push_str(&format!("- {reference}\n"));
        }
    }

    body
}

fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn conflict_markers_trip_only_on_head_and_tail() {
        assert!(has_conflict_markers("a\n<<<<<<< HEAD\nb\n"));
        assert!(has_conflict_markers(">>>>>>> feature\n"));
        assert!(!has_conflict_markers("Heading\n=======\nbody\n"));
        assert!(!has_conflict_markers("plain text\n"));
    }

    #[test]
    fn description_is_first_block_quote() {
        let body = "# title\n\n> Parses widgets.\n\nmore text\n> not this one\n";
        assert_eq!(extract_description(body), "Parses widgets.");
        assert_eq!(extract_description("no quotes here\n"), "");
    }

    #[test]
    fn build_document_carries_summary_and_dependencies() {
        let generated = GeneratedDoc {
            summary: "Parses widgets.\nLonger detail.".to_string(),
            interface_contract: "fn parse(input) -> Widget".to_string(),
            ..Default::default()
        };
        let deps = vec!["src/util.py".to_string(), "src/widget.py".to_string()];
        let body = build_document("src/parser.py", &generated, &deps);

        assert!(body.starts_with("# src/parser.py\n"));
        assert_eq!(extract_description(&body), "Parses widgets.");
        assert!(body.contains("## Interface"));
        assert!(body.contains("- src/util.py"));
        assert!(body.contains("- src/widget.py"));
    }

    #[test]
    fn relative_paths_normalize_to_forward_slashes() {
        let root = Path::new("/proj");
        assert_eq!(
            relative_path(root, Path::new("/proj/src/app.py")).unwrap(),
            "src/app.py"
        );
        assert_eq!(relative_path(root, Path::new("src/app.py")).unwrap(), "src/app.py");
        assert!(relative_path(root, Path::new("/elsewhere/app.py")).is_err());
    }

    #[test]
    fn stats_bucket_outcomes_by_level() {
        let mut stats = SweepStats::default();
        stats.record(FileOutcome::clean("a".into(), ChangeLevel::Unchanged));
        stats.record(FileOutcome::clean("b".into(), ChangeLevel::AgentUpdated));
        stats.record(FileOutcome::clean("c".into(), ChangeLevel::NewFile));
        stats.record(FileOutcome::failure("d".into(), ChangeLevel::ContentOnly));

        assert_eq!(stats.scanned, 4);
        assert_eq!(stats.unchanged, 1);
        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.generated, 1);
        assert_eq!(stats.failed, 1);
    }
}
