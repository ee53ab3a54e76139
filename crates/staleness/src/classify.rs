use crate::footer::DocFooter;
use crate::hash::Digest;
use serde::{Deserialize, Serialize};

/// How a source file changed relative to its design document
///
/// Recomputed on every check, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeLevel {
    /// No design document exists yet
    NewFile,
    /// The document was hand-edited (or its footer is missing/unparsable)
    AgentUpdated,
    /// Source and document both untouched
    Unchanged,
    /// Source bytes changed; no interface tracking for this language
    ContentChanged,
    /// Source bytes changed but the public interface is stable
    ContentOnly,
    /// The public interface changed
    InterfaceChanged,
}

impl ChangeLevel {
    /// Human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewFile => "new_file",
            Self::AgentUpdated => "agent_updated",
            Self::Unchanged => "unchanged",
            Self::ContentChanged => "content_changed",
            Self::ContentOnly => "content_only",
            Self::InterfaceChanged => "interface_changed",
        }
    }

    /// Does this level require a generation call?
    #[must_use]
    pub const fn needs_generation(self) -> bool {
        matches!(
            self,
            Self::NewFile | Self::ContentChanged | Self::ContentOnly | Self::InterfaceChanged
        )
    }
}

/// Freshly computed fingerprints for a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    /// Hash of the raw source bytes
    pub content: Digest,

    /// Hash of the canonical interface encoding; `None` when the language
    /// has no analyzer
    pub interface: Option<Digest>,
}

/// What is currently on disk for a design document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSnapshot {
    /// Parsed footer, or `None` for a missing/unparsable block
    pub footer: Option<DocFooter>,

    /// Body hash recomputed from the document as it exists right now
    pub body_digest: Digest,
}

/// Classify a (document, source) pair into exactly one change level
///
/// Pure decision table, first match wins. The hand-edit check (body hash
/// vs the footer's stored hash) dominates every source-side comparison: a
/// stale source hash must never trigger a regeneration that would clobber
/// a fresh manual edit.
pub fn classify(doc: Option<&DocSnapshot>, fresh: &SourceFingerprint) -> ChangeLevel {
    let Some(doc) = doc else {
        return ChangeLevel::NewFile;
    };

    let Some(footer) = &doc.footer else {
        return ChangeLevel::AgentUpdated;
    };

    if doc.body_digest != footer.design_hash {
        return ChangeLevel::AgentUpdated;
    }

    if footer.source_hash == fresh.content {
        return ChangeLevel::Unchanged;
    }

    match (&footer.interface_hash, &fresh.interface) {
        (None, None) => ChangeLevel::ContentChanged,
        (Some(stored), Some(current)) if stored == current => ChangeLevel::ContentOnly,
        _ => ChangeLevel::InterfaceChanged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn digest(tag: &str) -> Digest {
        Digest::of(tag.as_bytes())
    }

    fn footer(source_hash: &str, interface_hash: Option<&str>, design_hash: &str) -> DocFooter {
        DocFooter {
            source: "src/app.py".to_string(),
            source_hash: digest(source_hash),
            interface_hash: interface_hash.map(digest),
            design_hash: digest(design_hash),
            generated: "2026-08-07 10:15:00".to_string(),
            generator: "scribe 0.1.0".to_string(),
        }
    }

    fn fresh(content: &str, interface: Option<&str>) -> SourceFingerprint {
        SourceFingerprint {
            content: digest(content),
            interface: interface.map(digest),
        }
    }

    #[test]
    fn missing_document_is_new_file() {
        assert_eq!(classify(None, &fresh("c", Some("i"))), ChangeLevel::NewFile);
    }

    #[test]
    fn missing_footer_is_agent_updated() {
        let doc = DocSnapshot {
            footer: None,
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("c", Some("i"))),
            ChangeLevel::AgentUpdated
        );
    }

    #[test]
    fn body_edit_dominates_source_changes() {
        // Source changed AND the body was hand-edited: the edit wins.
        let doc = DocSnapshot {
            footer: Some(footer("old-content", Some("old-iface"), "body")),
            body_digest: digest("body-after-hand-edit"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new-content", Some("new-iface"))),
            ChangeLevel::AgentUpdated
        );
    }

    #[test]
    fn matching_hashes_are_unchanged() {
        let doc = DocSnapshot {
            footer: Some(footer("c", Some("i"), "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("c", Some("i"))),
            ChangeLevel::Unchanged
        );
    }

    #[test]
    fn no_interface_tracking_degrades_to_content_changed() {
        let doc = DocSnapshot {
            footer: Some(footer("old", None, "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new", None)),
            ChangeLevel::ContentChanged
        );
    }

    #[test]
    fn stable_interface_is_content_only() {
        let doc = DocSnapshot {
            footer: Some(footer("old", Some("i"), "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new", Some("i"))),
            ChangeLevel::ContentOnly
        );
    }

    #[test]
    fn changed_interface_is_interface_changed() {
        let doc = DocSnapshot {
            footer: Some(footer("old", Some("i1"), "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new", Some("i2"))),
            ChangeLevel::InterfaceChanged
        );
    }

    #[test]
    fn one_sided_interface_hash_is_interface_changed() {
        // Analyzer gained since the last generation.
        let doc = DocSnapshot {
            footer: Some(footer("old", None, "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new", Some("i"))),
            ChangeLevel::InterfaceChanged
        );

        // Analyzer lost since the last generation.
        let doc = DocSnapshot {
            footer: Some(footer("old", Some("i"), "body")),
            body_digest: digest("body"),
        };
        assert_eq!(
            classify(Some(&doc), &fresh("new", None)),
            ChangeLevel::InterfaceChanged
        );
    }

    #[test]
    fn classifier_is_total_over_reachable_inputs() {
        // Every (footer presence, body match, source match, interface
        // relation) combination lands on exactly one level.
        let interface_states: [(Option<&str>, Option<&str>); 4] = [
            (Some("i"), Some("i")),
            (Some("i"), Some("j")),
            (Some("i"), None),
            (None, None),
        ];

        for footer_present in [false, true] {
            for body_matches in [false, true] {
                for source_matches in [false, true] {
                    for (stored, current) in interface_states {
                        let doc = DocSnapshot {
                            footer: footer_present.then(|| footer("c", stored, "body")),
                            body_digest: digest(if body_matches { "body" } else { "edited" }),
                        };
                        let fingerprint =
                            fresh(if source_matches { "c" } else { "other" }, current);
                        // Must not panic; exactness is covered by the
                        // scenario tests above.
                        let _ = classify(Some(&doc), &fingerprint);
                    }
                }
            }
        }
    }
}
