use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the per-directory index artifact
pub const INDEX_FILE_NAME: &str = "index.json";

/// Kind of an index entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
}

/// One entry in a directory's index artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub kind: EntryKind,
    pub description: String,
}

/// Update or append exactly one entry in a directory's index
///
/// Unrelated entries are never reordered or deleted; new entries append in
/// first-touch order. Returns whether the index was actually rewritten.
pub async fn upsert_entry(
    dir: &Path,
    name: &str,
    kind: EntryKind,
    description: &str,
) -> Result<bool> {
    let path = dir.join(INDEX_FILE_NAME);

    let mut entries: Vec<IndexEntry> = match tokio::fs::read(&path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Unreadable index {}: {e}; rebuilding", path.display());
                Vec::new()
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    match entries
        .iter_mut()
        .find(|entry| entry.name == name && entry.kind == kind)
    {
        Some(entry) => {
            if entry.description == description {
                return Ok(false);
            }
            entry.description = description.to_string();
        }
        None => entries.push(IndexEntry {
            name: name.to_string(),
            kind,
            description: description.to_string(),
        }),
    }

    tokio::fs::create_dir_all(dir).await?;
    let bytes = serde_json::to_vec_pretty(&entries)?;
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(true)
}

/// Read a directory's index entries, empty when absent
pub async fn read_entries(dir: &Path) -> Result<Vec<IndexEntry>> {
    let path = dir.join(INDEX_FILE_NAME);
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_appends_then_updates_in_place() {
        let temp = tempdir().unwrap();

        assert!(upsert_entry(temp.path(), "a.py", EntryKind::File, "first").await.unwrap());
        assert!(upsert_entry(temp.path(), "b.py", EntryKind::File, "second").await.unwrap());
        assert!(upsert_entry(temp.path(), "a.py", EntryKind::File, "updated").await.unwrap());

        let entries = read_entries(temp.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.py", "b.py"]);
        assert_eq!(entries[0].description, "updated");
        assert_eq!(entries[1].description, "second");
    }

    #[tokio::test]
    async fn identical_description_skips_the_write() {
        let temp = tempdir().unwrap();
        assert!(upsert_entry(temp.path(), "a.py", EntryKind::File, "same").await.unwrap());
        assert!(!upsert_entry(temp.path(), "a.py", EntryKind::File, "same").await.unwrap());
    }

    #[tokio::test]
    async fn file_and_dir_entries_do_not_collide() {
        let temp = tempdir().unwrap();
        upsert_entry(temp.path(), "util", EntryKind::File, "a file").await.unwrap();
        upsert_entry(temp.path(), "util", EntryKind::Dir, "a directory").await.unwrap();

        let entries = read_entries(temp.path()).await.unwrap();
        assert_eq!(entries.len(), 2);
    }
}
