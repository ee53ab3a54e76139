use crate::config::SyncConfig;
use crate::error::Result;
use scribe_staleness::{design_body_digest, split_footer, Digest, DocFooter};
use std::path::PathBuf;

/// A design document as it currently exists on disk
#[derive(Debug, Clone)]
pub struct StoredDoc {
    /// Body text with the footer block stripped
    pub body: String,

    /// Parsed footer, or `None` for a missing/unparsable block
    pub footer: Option<DocFooter>,

    /// Body hash recomputed from disk
    pub body_digest: Digest,
}

/// On-disk store for design documents, mirroring the source tree
///
/// A source at `src/app.py` maps to `<output>/src/app.py.md`. Writes are
/// atomic: full content to a temp file, then rename.
pub struct DocStore {
    output_root: PathBuf,
}

impl DocStore {
    pub fn new(config: &SyncConfig) -> Self {
        Self {
            output_root: config.output_root(),
        }
    }

    /// Document path for a project-relative source path
    pub fn doc_path(&self, rel: &str) -> PathBuf {
        self.output_root.join(format!("{rel}.md"))
    }

    /// Read and split the document for a source file, if one exists
    pub async fn read(&self, rel: &str) -> Result<Option<StoredDoc>> {
        let path = self.doc_path(rel);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let (body, footer) = split_footer(&text);
        Ok(Some(StoredDoc {
            body_digest: design_body_digest(body),
            body: body.to_string(),
            footer,
        }))
    }

    /// Atomically write a document as body + footer
    pub async fn write(&self, rel: &str, body: &str, footer: &DocFooter) -> Result<()> {
        let path = self.doc_path(rel);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut document = String::with_capacity(body.len() + 512);
        document.push_str(body.trim_end_matches(['\n', '\r']));
        document.push_str("\n\n");
        document.push_str(&footer.render());

        let tmp = path.with_extension("md.tmp");
        tokio::fs::write(&tmp, document).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scribe_staleness::content_digest;
    use tempfile::tempdir;

    fn footer_for(body: &str) -> DocFooter {
        DocFooter {
            source: "src/app.py".to_string(),
            source_hash: content_digest(b"source"),
            interface_hash: None,
            design_hash: design_body_digest(body),
            generated: "2026-08-07 10:15:00".to_string(),
            generator: "scribe test".to_string(),
        }
    }

    #[tokio::test]
    async fn missing_document_reads_as_none() {
        let temp = tempdir().unwrap();
        let store = DocStore::new(&SyncConfig::new(temp.path()));
        assert!(store.read("src/app.py").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_read_preserves_body_and_footer() {
        let temp = tempdir().unwrap();
        let store = DocStore::new(&SyncConfig::new(temp.path()));

        let body = "# src/app.py\n\n> Does things.\n\nDetails.\n";
        let footer = footer_for(body);
        store.write("src/app.py", body, &footer).await.unwrap();

        let stored = store.read("src/app.py").await.unwrap().expect("document");
        assert_eq!(stored.footer, Some(footer));
        assert_eq!(stored.body_digest, design_body_digest(body));
        assert!(stored.body.starts_with("# src/app.py"));

        // No temp file left behind.
        let dir = store.doc_path("src/app.py");
        let siblings: Vec<_> = std::fs::read_dir(dir.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(siblings, vec!["app.py.md"]);
    }

    #[tokio::test]
    async fn rewrite_with_same_body_keeps_body_digest() {
        let temp = tempdir().unwrap();
        let store = DocStore::new(&SyncConfig::new(temp.path()));

        let body = "# doc\n\ncontent\n";
        store.write("a.txt", body, &footer_for(body)).await.unwrap();
        let first = store.read("a.txt").await.unwrap().unwrap();

        store.write("a.txt", &first.body, &footer_for(&first.body)).await.unwrap();
        let second = store.read("a.txt").await.unwrap().unwrap();

        assert_eq!(first.body_digest, second.body_digest);
    }
}
